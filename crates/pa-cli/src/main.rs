use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;

use pa_core::config::{ConvertOptions, load_options};
use pa_source::VideoSource;

pub mod cli;
pub mod pipeline;
pub mod progress;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_source()?;

    // 4. Charger la config puis appliquer les overrides CLI
    let mut opts = if cli.config.exists() {
        load_options(&cli.config)?
    } else {
        ConvertOptions::default()
    };
    cli.apply(&mut opts)?;
    let video_out: cli::VideoOut = cli.video_out.parse()?;

    // 5. Ctrl-C coopératif : le flag est consulté entre deux frames
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::SeqCst);
        })?;
    }

    // 6. Construire le convertisseur et dispatcher
    let mut converter = pipeline::Converter::new(opts, cli.dynamic_set, cli.refresh_charset)?;

    if let Some(ref dir) = cli.batch {
        converter.convert_batch(dir)
    } else if let Some(ref path) = cli.video {
        let base = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video")
            .to_string();
        let source = VideoSource::open_file(path)?;
        converter.convert_stream(Box::new(source), &base, video_out, &cancel)
    } else if cli.webcam {
        let source = VideoSource::open_webcam()?;
        converter.convert_stream(Box::new(source), "webcam", video_out, &cancel)
    } else if let Some(ref path) = cli.input {
        converter.convert_image(path)
    } else {
        unreachable!("validate_source garantit une source")
    }
}

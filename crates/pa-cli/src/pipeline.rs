//! Orchestration d'une conversion : résolution de la rampe, boucle de
//! frames, persistance des artefacts.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use pa_core::config::{ConvertOptions, OutputFormat};
use pa_core::error::PicaError;
use pa_core::frame::Frame;
use pa_core::ramp::{CharRamp, RampLut};
use pa_core::traits::FrameSource;
use pa_export::{GifAssembler, Mp4Muxer, naming};
use pa_font::builder::{base_chars, build_ramp};
use pa_font::cache::RampCache;
use pa_font::font::LoadedFont;
use pa_font::masks::MaskCache;
use pa_render::{Rendered, render_frame};
use pa_source::{Resizer, grid_size, open_image_source};

use crate::cli::VideoOut;
use crate::progress::StderrProgress;

/// Extensions prises en charge par le mode batch.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Durée d'affichage par défaut quand la source n'en fournit pas.
const DEFAULT_FRAME_MS: u32 = 40;

/// État partagé d'une conversion : options validées, rampe résolue, et
/// caches (atlas de glyphes, resizer) réutilisés d'une frame à l'autre.
pub struct Converter {
    opts: ConvertOptions,
    ramp: CharRamp,
    lut: RampLut,
    font: Option<LoadedFont>,
    masks: MaskCache,
    resizer: Resizer,
}

impl Converter {
    /// Résout la rampe et la police selon les options.
    ///
    /// La police n'est chargée que si nécessaire (raster ou charset
    /// dynamique). Son absence n'est fatale que pour le raster — les
    /// formats textuels se rabattent sur la rampe embarquée.
    ///
    /// # Errors
    /// `FontLoad` pour un raster sans aucune police chargeable ; échec de
    /// lecture/écriture du cache de charset.
    pub fn new(opts: ConvertOptions, dynamic_set: bool, refresh_charset: bool) -> Result<Self> {
        opts.validate()?;
        let needs_font = dynamic_set || opts.format == OutputFormat::Raster;
        let font = if needs_font {
            match LoadedFont::load_or_default(opts.font_path.as_deref()) {
                Ok(font) => Some(font),
                Err(e) if opts.format == OutputFormat::Raster => return Err(e.into()),
                Err(e) => {
                    log::warn!("{e} — rampe embarquée utilisée");
                    None
                }
            }
        } else {
            None
        };

        let ramp = match (dynamic_set, font.as_ref()) {
            (true, Some(font)) => RampCache::default_location().get_or_build(
                font.identity(),
                refresh_charset,
                || Ok(build_ramp(font, &base_chars())),
            )?,
            _ => CharRamp::default_ramp(),
        };
        let lut = RampLut::new(&ramp);

        Ok(Self {
            opts,
            ramp,
            lut,
            font,
            masks: MaskCache::new(),
            resizer: Resizer::new(),
        })
    }

    /// Rend une frame source : resize vers la grille puis émission.
    fn render_one(&mut self, frame: &Frame, label: &str) -> Result<Rendered> {
        let (gw, gh) = grid_size(
            frame.width,
            frame.height,
            self.opts.scale,
            self.opts.cell_width,
            self.opts.cell_height,
        );
        let small = self.resizer.resize(frame, gw, gh)?;

        let atlas = match (self.opts.format, self.font.as_ref()) {
            (OutputFormat::Raster, Some(font)) => Some(self.masks.get_or_build(
                font,
                self.opts.cell_width,
                self.opts.cell_height,
                &self.ramp,
            )),
            _ => None,
        };

        let mut progress = StderrProgress::new(label);
        let rendered = render_frame(
            &small,
            &self.opts,
            &self.ramp,
            &self.lut,
            atlas.as_deref(),
            &mut progress,
        )?;
        Ok(rendered)
    }

    /// Persiste un rendu : fichier dans `output_dir`, ou stdout pour ANSI.
    fn persist(&self, rendered: &Rendered, stem: &str) -> Result<()> {
        if let Rendered::Ansi(text) = rendered {
            let mut out = std::io::stdout().lock();
            out.write_all(b"\n")?;
            out.write_all(text.as_bytes())?;
            return Ok(());
        }

        std::fs::create_dir_all(&self.opts.output_dir)
            .with_context(|| format!("création de {}", self.opts.output_dir.display()))?;
        let Some(ext) = self.opts.format.extension() else {
            return Ok(());
        };
        let path = self.opts.output_dir.join(format!("{stem}.{ext}"));
        match rendered {
            Rendered::Raster(img) => img
                .save(&path)
                .with_context(|| format!("écriture de {}", path.display()))?,
            Rendered::Text(s) | Rendered::Html(s) => std::fs::write(&path, s)
                .with_context(|| format!("écriture de {}", path.display()))?,
            Rendered::Ansi(_) => unreachable!("ANSI traité plus haut"),
        }
        log::info!("écrit : {}", path.display());
        Ok(())
    }

    /// Convertit une image fixe ou un GIF animé.
    ///
    /// Chaque frame d'une source animée produit son artefact indexé, sauf
    /// en mode assemble où les frames raster sont réunies en un GIF unique.
    ///
    /// # Errors
    /// Décodage de la source, rendu, ou écriture d'un artefact.
    pub fn convert_image(&mut self, path: &Path) -> Result<()> {
        let base = file_stem(path);
        let mut source = open_image_source(path)?;

        let mut assembler = if self.opts.assemble {
            if self.opts.format == OutputFormat::Raster {
                Some(GifAssembler::new())
            } else {
                log::warn!("--assemble exige --format image, frames émises séparément");
                None
            }
        } else {
            None
        };

        // Lookahead d'une frame : le suffixe d'index n'apparaît que pour
        // les sources réellement multi-frames.
        let mut index = 0u32;
        let mut current = source.next_frame();
        let mut next = if current.is_some() {
            source.next_frame()
        } else {
            None
        };
        if current.is_none() {
            anyhow::bail!("{} : aucune frame décodable", path.display());
        }

        while let Some(frame) = current {
            let multi = index > 0 || next.is_some();
            let stem = naming::output_stem(
                self.opts.bg_brightness,
                self.opts.scale,
                &base,
                multi.then_some(index),
            );
            let result = self.render_one(&frame, &stem).and_then(|rendered| {
                match (assembler.as_mut(), rendered) {
                    (Some(asm), Rendered::Raster(img)) => {
                        asm.push(img, frame.delay_ms.unwrap_or(DEFAULT_FRAME_MS));
                        Ok(())
                    }
                    (_, rendered) => self.persist(&rendered, &stem),
                }
            });
            if let Err(e) = result {
                // Une frame en échec n'interrompt pas une séquence, mais une
                // image fixe en échec est un échec de l'entrée.
                if multi {
                    log::error!("frame {index} sautée : {e:#}");
                } else {
                    return Err(e);
                }
            }
            index += 1;
            current = next;
            next = source.next_frame();
        }

        if let Some(asm) = assembler {
            if !asm.is_empty() {
                std::fs::create_dir_all(&self.opts.output_dir)
                    .with_context(|| format!("création de {}", self.opts.output_dir.display()))?;
                let stem =
                    naming::output_stem(self.opts.bg_brightness, self.opts.scale, &base, None);
                let gif_path = self.opts.output_dir.join(format!("{stem}.gif"));
                asm.write(&gif_path, self.opts.gif_fps, self.opts.gif_loop)
                    .map_err(|e| PicaError::Encode(format!("{e:#}")))?;
            }
        }
        Ok(())
    }

    /// Convertit toutes les images d'un dossier, dans l'ordre des noms.
    ///
    /// Une image en échec est signalée et n'interrompt pas les suivantes.
    ///
    /// # Errors
    /// Dossier illisible ou sans aucune image reconnue.
    pub fn convert_batch(&mut self, dir: &Path) -> Result<()> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("lecture de {}", dir.display()))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
            })
            .collect();
        paths.sort();
        if paths.is_empty() {
            anyhow::bail!("aucune image reconnue dans {}", dir.display());
        }

        let mut converted = 0usize;
        for path in &paths {
            match self.convert_image(path) {
                Ok(()) => converted += 1,
                Err(e) => log::error!("{} : {e:#}", path.display()),
            }
        }
        log::info!("lot terminé : {converted}/{} images", paths.len());
        Ok(())
    }

    /// Convertit un flux vidéo ou webcam, frame par frame, jusqu'à
    /// épuisement de la source ou Ctrl-C.
    ///
    /// L'annulation est vérifiée entre les frames : la sortie en cours
    /// (GIF, MP4) est toujours finalisée proprement.
    ///
    /// # Errors
    /// `InvalidParameter` pour une destination gif/mp4 sans format raster ;
    /// échec de rendu, d'écriture ou d'encodage.
    pub fn convert_stream(
        &mut self,
        mut source: Box<dyn FrameSource>,
        base: &str,
        out: VideoOut,
        cancel: &Arc<AtomicBool>,
    ) -> Result<()> {
        if out != VideoOut::Frames && self.opts.format != OutputFormat::Raster {
            return Err(PicaError::InvalidParameter(
                "--video-out gif/mp4 exige --format image".to_string(),
            )
            .into());
        }

        let mut assembler = (out == VideoOut::Gif).then(GifAssembler::new);
        let mut muxer: Option<Mp4Muxer> = None;
        let mut index = 0u32;

        while let Some(frame) = source.next_frame() {
            if cancel.load(Ordering::SeqCst) {
                log::info!("interruption reçue, finalisation de la sortie");
                break;
            }
            let frame_base = naming::video_frame_base(base, index);
            let stem = naming::output_stem(
                self.opts.bg_brightness,
                self.opts.scale,
                &frame_base,
                None,
            );
            let rendered = match self.render_one(&frame, &stem) {
                Ok(rendered) => rendered,
                Err(e) => {
                    log::error!("frame {index} sautée : {e:#}");
                    index += 1;
                    continue;
                }
            };

            match out {
                VideoOut::Frames => self.persist(&rendered, &stem)?,
                VideoOut::Gif => {
                    if let Rendered::Raster(img) = rendered {
                        if let Some(asm) = assembler.as_mut() {
                            asm.push(img, frame.delay_ms.unwrap_or(DEFAULT_FRAME_MS));
                        }
                    }
                }
                VideoOut::Mp4 => {
                    if let Rendered::Raster(img) = rendered {
                        if muxer.is_none() {
                            std::fs::create_dir_all(&self.opts.output_dir).with_context(|| {
                                format!("création de {}", self.opts.output_dir.display())
                            })?;
                            let mp4_path = self.opts.output_dir.join(format!("{base}.mp4"));
                            let fps = frame
                                .delay_ms
                                .map_or(24.0, |ms| 1000.0 / ms.max(1) as f32);
                            muxer =
                                Some(Mp4Muxer::new(&mp4_path, img.width(), img.height(), fps)?);
                        }
                        if let Some(m) = muxer.as_mut() {
                            m.write_frame(&img)?;
                        }
                    }
                }
            }
            index += 1;
        }

        if let Some(asm) = assembler {
            if !asm.is_empty() {
                let gif_path = self.opts.output_dir.join(format!("{base}.gif"));
                let fps = self.opts.gif_fps.or(Some(24.0));
                asm.write(&gif_path, fps, self.opts.gif_loop)
                    .map_err(|e| PicaError::Encode(format!("{e:#}")))?;
            }
        }
        if let Some(m) = muxer {
            m.finish().map_err(|e| PicaError::Encode(format!("{e:#}")))?;
        }
        log::info!("{index} frames converties depuis {base}");
        Ok(())
    }
}

/// Stem du fichier source, ou `"output"` pour un chemin sans nom exploitable.
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_in(dir: &Path, format: OutputFormat) -> ConvertOptions {
        ConvertOptions {
            format,
            scale: 1.0,
            cell_width: 10,
            cell_height: 10,
            output_dir: dir.to_path_buf(),
            ..ConvertOptions::default()
        }
    }

    fn write_png(path: &Path, w: u32, h: u32, v: u8) {
        image::RgbImage::from_pixel(w, h, image::Rgb([v, v, v]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn still_image_to_text_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("white.png");
        write_png(&input, 4, 3, 255);

        let opts = options_in(dir.path(), OutputFormat::Text);
        let mut conv = Converter::new(opts, false, false).unwrap();
        conv.convert_image(&input).unwrap();

        let out = dir.path().join("O_h_30_f_1_white.txt");
        let text = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.chars().count() == 4));
    }

    #[test]
    fn html_artifact_carries_background() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.png");
        write_png(&input, 2, 2, 128);

        let mut opts = options_in(dir.path(), OutputFormat::Html);
        opts.bg_brightness = 9;
        let mut conv = Converter::new(opts, false, false).unwrap();
        conv.convert_image(&input).unwrap();

        let html = std::fs::read_to_string(dir.path().join("O_h_9_f_1_gray.html")).unwrap();
        assert!(html.contains("background-color:rgb(9,9,9)"));
        assert!(html.contains("color:rgb(128,128,128)"));
    }

    #[test]
    fn missing_input_fails_with_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options_in(dir.path(), OutputFormat::Text);
        let mut conv = Converter::new(opts, false, false).unwrap();
        let err = conv.convert_image(Path::new("/nonexistent/x.png"));
        assert!(err.is_err());
    }

    #[test]
    fn batch_isolates_per_image_failures() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in");
        std::fs::create_dir(&src).unwrap();
        write_png(&src.join("ok.png"), 2, 2, 200);
        std::fs::write(src.join("broken.png"), b"not an image").unwrap();
        std::fs::write(src.join("notes.txt"), b"ignored").unwrap();

        let out = dir.path().join("out");
        let opts = options_in(&out, OutputFormat::Text);
        let mut conv = Converter::new(opts, false, false).unwrap();
        conv.convert_batch(&src).unwrap();

        assert!(out.join("O_h_30_f_1_ok.txt").exists());
        assert!(!out.join("O_h_30_f_1_broken.txt").exists());
    }

    #[test]
    fn empty_batch_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options_in(dir.path(), OutputFormat::Text);
        let mut conv = Converter::new(opts, false, false).unwrap();
        assert!(conv.convert_batch(dir.path()).is_err());
    }

    #[test]
    fn stream_to_gif_rejects_text_format() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options_in(dir.path(), OutputFormat::Text);
        let mut conv = Converter::new(opts, false, false).unwrap();

        struct Empty;
        impl FrameSource for Empty {
            fn next_frame(&mut self) -> Option<Frame> {
                None
            }
            fn native_size(&self) -> (u32, u32) {
                (0, 0)
            }
            fn is_live(&self) -> bool {
                false
            }
        }
        let cancel = Arc::new(AtomicBool::new(false));
        let err = conv.convert_stream(Box::new(Empty), "clip", VideoOut::Gif, &cancel);
        assert!(err.is_err());
    }

    #[test]
    fn cancelled_stream_stops_before_first_frame() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options_in(dir.path(), OutputFormat::Text);
        let mut conv = Converter::new(opts, false, false).unwrap();

        struct Endless;
        impl FrameSource for Endless {
            fn next_frame(&mut self) -> Option<Frame> {
                Some(Frame::filled(2, 2, (0, 0, 0)))
            }
            fn native_size(&self) -> (u32, u32) {
                (2, 2)
            }
            fn is_live(&self) -> bool {
                true
            }
        }
        let cancel = Arc::new(AtomicBool::new(true));
        conv.convert_stream(Box::new(Endless), "cam", VideoOut::Frames, &cancel)
            .unwrap();
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}

//! Encodage MP4 des frames raster via ffmpeg en subprocess.
//!
//! Les frames RGB brutes sont poussées sur le stdin de ffmpeg, qui encode
//! en H.264 au fil de l'eau — aucun PNG intermédiaire sur disque.

use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result};
use image::RgbImage;

/// Encodeur MP4 en flux : une frame poussée à la fois.
pub struct Mp4Muxer {
    child: Child,
    width: u32,
    height: u32,
}

impl Mp4Muxer {
    /// Lance ffmpeg pour encoder `width × height` à `fps` images/s.
    ///
    /// `yuv420p` impose des dimensions paires — elles le sont toujours
    /// avec des cellules de taille paire, sinon ffmpeg refuse le flux.
    ///
    /// # Errors
    /// ffmpeg introuvable ou impossible à démarrer.
    pub fn new(output_path: &Path, width: u32, height: u32, fps: f32) -> Result<Self> {
        let path_str = output_path.to_str().context("chemin de sortie invalide (non-UTF8)")?;

        let child = Command::new("ffmpeg")
            .args([
                "-y",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{width}x{height}"),
                "-r",
                &format!("{fps}"),
                "-i",
                "-",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-hide_banner",
                "-loglevel",
                "error",
                path_str,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Impossible de lancer ffmpeg. Est-il installé et dans le PATH ?")?;

        Ok(Self {
            child,
            width,
            height,
        })
    }

    /// Pousse une frame. Ses dimensions doivent être celles du muxer.
    ///
    /// # Errors
    /// Dimensions inattendues, ou pipe fermé (ffmpeg a quitté).
    pub fn write_frame(&mut self, image: &RgbImage) -> Result<()> {
        if image.dimensions() != (self.width, self.height) {
            anyhow::bail!(
                "frame {}x{} dans un flux {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height
            );
        }
        if let Some(stdin) = self.child.stdin.as_mut() {
            stdin.write_all(image.as_raw()).context("écriture vers ffmpeg")?;
        }
        Ok(())
    }

    /// Ferme le flux et attend la fin de l'encodage.
    ///
    /// # Errors
    /// ffmpeg a terminé en erreur (le stderr est remonté dans le message).
    pub fn finish(mut self) -> Result<()> {
        drop(self.child.stdin.take());
        let output = self.child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg : {stderr}");
        }
        Ok(())
    }
}

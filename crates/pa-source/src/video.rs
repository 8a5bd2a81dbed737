//! Source vidéo/webcam via ffmpeg en subprocess.
//!
//! ffmpeg décode le conteneur et écrit des frames RGB brutes sur stdout ;
//! chaque frame fait `w × h × 3` bytes, tirée de manière synchrone par
//! `next_frame`. Prérequis : `ffmpeg` et `ffprobe` dans le PATH.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result};

use pa_core::frame::Frame;
use pa_core::traits::FrameSource;

/// Résolution de capture webcam. Fixe : ffprobe ne sait pas interroger
/// un périphérique avant ouverture.
const WEBCAM_SIZE: (u32, u32) = (640, 480);
const WEBCAM_FPS: f64 = 30.0;

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde (ex : 23.976, 24.0, 30.0).
    pub fps: f64,
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Retourne une erreur si `ffprobe` est introuvable ou si le fichier ne
/// contient aucun flux vidéo décodable.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let path_str = path.to_str().context("chemin vidéo invalide (non-UTF8)")?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context("Impossible de lancer ffprobe. Est-il installé et dans le PATH ?")?;

    let text = String::from_utf8_lossy(&output.stdout);

    let mut width: u32 = 0;
    let mut height: u32 = 0;
    let mut fps: f64 = 30.0;

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format : "24/1" ou "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 {
                fps = num / den;
            }
        }
    }

    if width == 0 || height == 0 {
        anyhow::bail!("ffprobe n'a trouvé aucun flux vidéo dans {}", path.display());
    }

    log::info!("probe_video: {width}x{height} @ {fps:.3}fps — {}", path.display());

    Ok(VideoInfo { width, height, fps })
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant
/// complétion, `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false), // EOF
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Source de frames tirées d'un pipe ffmpeg (fichier vidéo ou webcam).
pub struct VideoSource {
    child: Child,
    width: u32,
    height: u32,
    fps: f64,
    live: bool,
    done: bool,
}

impl VideoSource {
    /// Ouvre un fichier vidéo.
    ///
    /// # Errors
    /// Échec de ffprobe (fichier sans flux vidéo) ou du spawn ffmpeg.
    pub fn open_file(path: &Path) -> Result<Self> {
        let info = probe_video(path)?;
        let path_str = path.to_str().context("chemin vidéo invalide (non-UTF8)")?;
        let child = spawn_decoder(&["-i", path_str])?;
        Ok(Self {
            child,
            width: info.width,
            height: info.height,
            fps: info.fps,
            live: false,
            done: false,
        })
    }

    /// Ouvre la webcam par défaut (v4l2, `/dev/video0`).
    ///
    /// # Errors
    /// Échec du spawn ffmpeg ou périphérique indisponible.
    pub fn open_webcam() -> Result<Self> {
        let size_arg = format!("{}x{}", WEBCAM_SIZE.0, WEBCAM_SIZE.1);
        let child = spawn_decoder(&[
            "-f",
            "v4l2",
            "-video_size",
            &size_arg,
            "-i",
            "/dev/video0",
        ])?;
        Ok(Self {
            child,
            width: WEBCAM_SIZE.0,
            height: WEBCAM_SIZE.1,
            fps: WEBCAM_FPS,
            live: true,
            done: false,
        })
    }
}

/// Spawne ffmpeg avec les arguments d'entrée donnés, sortie RGB brute
/// sur stdout.
fn spawn_decoder(input_args: &[&str]) -> Result<Child> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(input_args).args([
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
        "-an",
        "-hide_banner",
        "-loglevel",
        "error",
        "pipe:1",
    ]);
    cmd.stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Impossible de lancer ffmpeg. Est-il installé et dans le PATH ?")
}

impl FrameSource for VideoSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }
        let mut frame = Frame::new(self.width, self.height);
        frame.delay_ms = Some(((1000.0 / self.fps.max(1.0)).round() as u32).max(1));

        let read = self
            .child
            .stdout
            .as_mut()
            .map_or(Ok(false), |out| read_exact_or_eof(out, &mut frame.data));

        match read {
            Ok(true) => Some(frame),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                log::warn!("lecture du pipe ffmpeg : {e}");
                self.done = true;
                None
            }
        }
    }

    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_exact_or_eof_reports_short_stream() {
        let data = [1u8, 2, 3];
        let mut cursor = std::io::Cursor::new(&data[..]);
        let mut buf = [0u8; 5];
        assert!(!read_exact_or_eof(&mut cursor, &mut buf).unwrap());
    }

    #[test]
    fn read_exact_or_eof_fills_buffer() {
        let data = [7u8; 8];
        let mut cursor = std::io::Cursor::new(&data[..]);
        let mut buf = [0u8; 8];
        assert!(read_exact_or_eof(&mut cursor, &mut buf).unwrap());
        assert_eq!(buf, data);
    }
}

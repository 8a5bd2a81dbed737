//! Assemblage des frames raster rendues en un GIF animé unique.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, RgbImage};

/// Collecte des frames rendues puis les encode d'un bloc.
///
/// Les durées par frame viennent de la source ; un `fps_override` les
/// remplace toutes par une cadence fixe à l'écriture.
#[derive(Default)]
pub struct GifAssembler {
    frames: Vec<(RgbImage, u32)>,
}

impl GifAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une frame avec sa durée d'affichage en millisecondes.
    pub fn push(&mut self, image: RgbImage, delay_ms: u32) {
        self.frames.push((image, delay_ms.max(1)));
    }

    /// Nombre de frames collectées.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Encode le GIF. `gif_loop` : 0 = boucle infinie, n = n répétitions.
    ///
    /// # Errors
    /// Échec de création du fichier ou d'encodage d'une frame.
    pub fn write(self, path: &Path, fps_override: Option<f32>, gif_loop: u32) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Impossible de créer {}", path.display()))?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));

        let repeat = if gif_loop == 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(gif_loop.min(u32::from(u16::MAX)) as u16)
        };
        encoder.set_repeat(repeat).context("en-tête GIF")?;

        let fixed_ms = fps_override.map(|fps| ((1000.0 / fps) as u32).max(1));
        let count = self.frames.len();
        for (image, delay_ms) in self.frames {
            let ms = fixed_ms.unwrap_or(delay_ms);
            let rgba = DynamicImage::ImageRgb8(image).to_rgba8();
            let frame = image::Frame::from_parts(rgba, 0, 0, Delay::from_numer_denom_ms(ms, 1));
            encoder.encode_frame(frame).context("encodage frame GIF")?;
        }
        log::info!("GIF assemblé : {count} frames → {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::AnimationDecoder;
    use image::codecs::gif::GifDecoder;

    fn flat(v: u8) -> RgbImage {
        RgbImage::from_pixel(4, 4, image::Rgb([v, v, v]))
    }

    #[test]
    fn assembled_gif_decodes_with_source_delays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");

        let mut asm = GifAssembler::new();
        asm.push(flat(0), 40);
        asm.push(flat(255), 120);
        assert_eq!(asm.len(), 2);
        asm.write(&path, None, 0).unwrap();

        let decoder = GifDecoder::new(std::io::BufReader::new(File::open(&path).unwrap())).unwrap();
        let frames: Vec<_> = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].delay().numer_denom_ms().0, 40);
        assert_eq!(frames[1].delay().numer_denom_ms().0, 120);
    }

    #[test]
    fn fps_override_flattens_delays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixed.gif");

        let mut asm = GifAssembler::new();
        asm.push(flat(10), 40);
        asm.push(flat(20), 999);
        // 25 fps → 40 ms par frame, quelles que soient les durées source.
        asm.write(&path, Some(25.0), 1).unwrap();

        let decoder = GifDecoder::new(std::io::BufReader::new(File::open(&path).unwrap())).unwrap();
        let frames: Vec<_> = decoder.into_frames().collect_frames().unwrap();
        assert!(frames.iter().all(|f| f.delay().numer_denom_ms().0 == 40));
    }

    #[test]
    fn zero_delay_is_clamped_to_one_ms() {
        let mut asm = GifAssembler::new();
        asm.push(flat(0), 0);
        assert!(!asm.is_empty());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clamp.gif");
        asm.write(&path, None, 0).unwrap();
        assert!(path.exists());
    }
}

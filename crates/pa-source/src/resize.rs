use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};

use pa_core::frame::Frame;

/// Dimensions de la grille de caractères pour une frame source.
///
/// Largeur = `scale × w` ; hauteur = `scale × h × (cell_w / cell_h)` —
/// la correction compense des cellules non carrées. Jamais en dessous
/// de 1×1.
///
/// # Example
/// ```
/// use pa_source::resize::grid_size;
/// assert_eq!(grid_size(100, 100, 1.0, 10, 18), (100, 55));
/// assert_eq!(grid_size(3, 3, 0.01, 10, 18), (1, 1));
/// ```
#[must_use]
pub fn grid_size(src_w: u32, src_h: u32, scale: f32, cell_w: u32, cell_h: u32) -> (u32, u32) {
    let w = (scale * src_w as f32) as u32;
    let h = (scale * src_h as f32 * (cell_w as f32 / cell_h as f32)) as u32;
    (w.max(1), h.max(1))
}

/// Resizer réutilisable wrappant fast_image_resize, en nearest-neighbor.
///
/// Le nearest préserve les bords francs, ce qui convient au mapping
/// 1 pixel → 1 cellule. Le resizer est pré-alloué pour éviter les
/// allocations répétées sur les sources multi-frames.
///
/// # Example
/// ```
/// use pa_source::resize::Resizer;
/// use pa_core::frame::Frame;
/// let mut r = Resizer::new();
/// let src = Frame::filled(100, 100, (9, 9, 9));
/// let dst = r.resize(&src, 20, 11).unwrap();
/// assert_eq!((dst.width, dst.height), (20, 11));
/// assert_eq!(dst.pixel(0, 0), (9, 9, 9));
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Copie de la source imposée par l'API &mut de fast_image_resize.
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Nearest),
            src_buf: Vec::new(),
        }
    }

    /// Redimensionne `src` vers `width × height`, en conservant la durée
    /// d'affichage de la frame.
    ///
    /// # Errors
    /// Returns an error if the resize operation fails.
    pub fn resize(&mut self, src: &Frame, width: u32, height: u32) -> Result<Frame> {
        let mut dst = Frame::new(width, height);
        dst.delay_ms = src.delay_ms;

        if src.width == width && src.height == height {
            dst.data.copy_from_slice(&src.data);
            return Ok(dst);
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x3)
                .context("dimensions source invalides")?;
        let mut dst_image = Image::from_slice_u8(width, height, &mut dst.data, PixelType::U8x3)
            .context("dimensions destination invalides")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("échec du resize")?;

        Ok(dst)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size_applies_aspect_correction() {
        // Cellules 10×18 : la hauteur rétrécit de 10/18.
        assert_eq!(grid_size(90, 90, 1.0, 10, 18), (90, 50));
        // Cellules carrées : pas de correction.
        assert_eq!(grid_size(50, 40, 0.5, 8, 8), (25, 20));
    }

    #[test]
    fn grid_size_never_collapses_to_zero() {
        assert_eq!(grid_size(1, 1, 0.001, 10, 18), (1, 1));
    }

    #[test]
    fn identity_resize_copies_pixels() {
        let mut r = Resizer::new();
        let mut src = Frame::filled(3, 2, (1, 2, 3));
        src.delay_ms = Some(40);
        let dst = r.resize(&src, 3, 2).unwrap();
        assert_eq!(dst.data, src.data);
        assert_eq!(dst.delay_ms, Some(40));
    }

    #[test]
    fn nearest_downscale_keeps_flat_color() {
        let mut r = Resizer::new();
        let src = Frame::filled(64, 64, (200, 100, 50));
        let dst = r.resize(&src, 7, 5).unwrap();
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(dst.pixel(x, y), (200, 100, 50));
            }
        }
    }
}

/// Une frame source : pixels RGB row-major, 3 bytes par pixel.
///
/// Produite par une source (image fixe, GIF animé, pipe vidéo), consommée
/// exactement une fois par le renderer puis jetée. `delay_ms` porte la durée
/// d'affichage de la frame pour les sources animées.
///
/// # Example
/// ```
/// use pa_core::frame::Frame;
/// let f = Frame::new(10, 10);
/// assert_eq!(f.data.len(), 300);
/// ```
#[derive(Clone)]
pub struct Frame {
    /// Pixels RGB, row-major, 3 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Durée d'affichage (sources animées). `None` pour une image fixe.
    pub delay_ms: Option<u32>,
}

impl Frame {
    /// Crée une frame noire aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; (width * height * 3) as usize],
            width,
            height,
            delay_ms: None,
        }
    }

    /// Crée une frame remplie d'une couleur uniforme. Utilisé par les tests.
    ///
    /// # Example
    /// ```
    /// use pa_core::frame::Frame;
    /// let f = Frame::filled(2, 2, (128, 128, 128));
    /// assert_eq!(f.pixel(1, 1), (128, 128, 128));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: (u8, u8, u8)) -> Self {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb.0, rgb.1, rgb.2]);
        }
        Self {
            data,
            width,
            height,
            delay_ms: None,
        }
    }

    /// Accès au pixel (x, y) → (r, g, b).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = ((y * self.width + x) * 3) as usize;
        if idx + 2 >= self.data.len() {
            return (0, 0, 0);
        }
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Une ligne de pixels, `width * 3` bytes. Hot path du renderer.
    #[inline(always)]
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = (self.width * 3) as usize;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_has_expected_stride() {
        let f = Frame::filled(4, 2, (1, 2, 3));
        assert_eq!(f.row(1).len(), 12);
        assert_eq!(f.row(0)[3..6], [1, 2, 3]);
    }
}

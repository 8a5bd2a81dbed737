//! Passe commune à tous les formats de sortie : une frame redimensionnée
//! devient une grille de cellules (glyphe + couleur).
//!
//! Un pixel de la frame = une cellule. La luminosité passe par le tramage
//! éventuel, puis par la LUT de rampe ; la couleur est soit le RGB
//! d'origine, soit le gris quantifié en mode mono.

use pa_core::config::ConvertOptions;
use pa_core::frame::Frame;
use pa_core::luma::brightness;
use pa_core::ramp::{CharRamp, RampLut};
use pa_core::traits::ProgressSink;

/// Grille de cellules rendue, `width × height`, ordre ligne par ligne.
pub struct CellGrid {
    pub width: u32,
    pub height: u32,
    glyphs: Vec<char>,
    colors: Vec<(u8, u8, u8)>,
}

impl CellGrid {
    /// Calcule la grille pour une frame déjà à la résolution de grille.
    ///
    /// Le tramage impose un balayage séquentiel ; la progression est
    /// signalée par scanline, bornes (0, h) et (h, h) incluses.
    #[must_use]
    pub fn compute(
        frame: &Frame,
        opts: &ConvertOptions,
        ramp: &CharRamp,
        lut: &RampLut,
        progress: &mut dyn ProgressSink,
    ) -> Self {
        let (w, h) = (frame.width, frame.height);
        let cells = (w as usize) * (h as usize);
        let mut glyphs = Vec::with_capacity(cells);
        let mut colors = Vec::with_capacity(cells);
        let mut dither = crate::dither::Ditherer::new(opts.dither, w, ramp.len());

        progress.on_progress(0, h);
        for y in 0..h {
            dither.begin_row();
            let row = frame.row(y);
            for x in 0..w as usize {
                let (r, g, b) = (row[x * 3], row[x * 3 + 1], row[x * 3 + 2]);
                let base = brightness(r, g, b, opts.grayscale);
                let q = dither.process(x, base);
                glyphs.push(lut.glyph(ramp, q));
                colors.push(if opts.mono { (q, q, q) } else { (r, g, b) });
            }
            progress.on_progress(y + 1, h);
        }

        Self {
            width: w,
            height: h,
            glyphs,
            colors,
        }
    }

    /// Glyphe de la cellule (x, y).
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, x: u32, y: u32) -> char {
        self.glyphs[(y * self.width + x) as usize]
    }

    /// Couleur de la cellule (x, y).
    #[inline(always)]
    #[must_use]
    pub fn color(&self, x: u32, y: u32) -> (u8, u8, u8) {
        self.colors[(y * self.width + x) as usize]
    }

    /// Les glyphes d'une ligne, pour les émetteurs texte.
    #[must_use]
    pub fn glyph_row(&self, y: u32) -> &[char] {
        let start = (y * self.width) as usize;
        &self.glyphs[start..start + self.width as usize]
    }

    /// Les couleurs d'une ligne.
    #[must_use]
    pub fn color_row(&self, y: u32) -> &[(u8, u8, u8)] {
        let start = (y * self.width) as usize;
        &self.colors[start..start + self.width as usize]
    }
}

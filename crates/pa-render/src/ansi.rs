//! Émetteur ANSI truecolor, destiné au terminal — jamais persisté.

use crate::grid::CellGrid;

/// Sérialise la grille en texte ANSI : chaque glyphe est préfixé de sa
/// couleur `38;2;r;g;b`, chaque ligne se termine par un reset et un saut.
#[must_use]
pub fn emit(grid: &CellGrid) -> String {
    let mut out = String::new();
    for y in 0..grid.height {
        let colors = grid.color_row(y);
        for (x, &(r, g, b)) in colors.iter().enumerate() {
            out.push_str(&format!("\x1b[38;2;{r};{g};{b}m"));
            out.push(grid.glyph(x as u32, y));
        }
        out.push_str("\x1b[0m\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_core::config::ConvertOptions;
    use pa_core::frame::Frame;
    use pa_core::ramp::{CharRamp, RampLut};
    use pa_core::traits::NoopProgress;

    #[test]
    fn white_pixel_gets_truecolor_prefix_and_reset() {
        let ramp = " @".parse::<CharRamp>().unwrap();
        let lut = RampLut::new(&ramp);
        let frame = Frame::filled(1, 1, (255, 255, 255));
        let grid = CellGrid::compute(
            &frame,
            &ConvertOptions::default(),
            &ramp,
            &lut,
            &mut NoopProgress,
        );
        assert_eq!(emit(&grid), "\x1b[38;2;255;255;255m@\x1b[0m\n");
    }

    #[test]
    fn one_reset_per_row() {
        let ramp = " @".parse::<CharRamp>().unwrap();
        let lut = RampLut::new(&ramp);
        let frame = Frame::filled(3, 4, (10, 20, 30));
        let grid = CellGrid::compute(
            &frame,
            &ConvertOptions::default(),
            &ramp,
            &lut,
            &mut NoopProgress,
        );
        let out = emit(&grid);
        assert_eq!(out.matches("\x1b[0m\n").count(), 4);
        assert_eq!(out.matches("\x1b[38;2;10;20;30m").count(), 12);
    }
}

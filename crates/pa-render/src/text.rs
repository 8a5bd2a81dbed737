//! Émetteur texte brut : les glyphes seuls, couleurs ignorées.

use crate::grid::CellGrid;

/// Sérialise la grille en lignes jointes par `\n`, sans saut final.
#[must_use]
pub fn emit(grid: &CellGrid) -> String {
    let mut out = String::with_capacity((grid.width as usize + 1) * grid.height as usize);
    for y in 0..grid.height {
        if y > 0 {
            out.push('\n');
        }
        out.extend(grid.glyph_row(y));
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
    fn output_has_grid_shape() {
        let ramp = " #".parse::<CharRamp>().unwrap();
        let lut = RampLut::new(&ramp);
        let frame = Frame::filled(4, 3, (255, 255, 255));
        let grid = CellGrid::compute(
            &frame,
            &ConvertOptions::default(),
            &ramp,
            &lut,
            &mut NoopProgress,
        );
        let text = emit(&grid);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.chars().count() == 4));
        assert_eq!(lines[0], "####");
    }

    #[test]
    fn black_frame_is_all_lightest_glyph() {
        let ramp = " .#".parse::<CharRamp>().unwrap();
        let lut = RampLut::new(&ramp);
        let frame = Frame::filled(3, 2, (0, 0, 0));
        let grid = CellGrid::compute(
            &frame,
            &ConvertOptions::default(),
            &ramp,
            &lut,
            &mut NoopProgress,
        );
        assert_eq!(emit(&grid), "   \n   ");
    }
}

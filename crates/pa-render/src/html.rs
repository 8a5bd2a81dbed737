//! Émetteur HTML : un span coloré par cellule, page monospace complète.

use crate::grid::CellGrid;

/// Échappement minimal pour un glyphe inséré dans du HTML.
fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#x27;"),
        other => out.push(other),
    }
}

/// Sérialise la grille en document HTML autonome.
///
/// Chaque glyphe porte sa couleur en style inline ; les lignes sont
/// jointes par `<br>` dans un `<pre>` monospace sur fond gris
/// `bg_brightness`.
#[must_use]
pub fn emit(grid: &CellGrid, bg_brightness: u8) -> String {
    let mut body = String::new();
    for y in 0..grid.height {
        if y > 0 {
            body.push_str("<br>\n");
        }
        let colors = grid.color_row(y);
        for (x, &(r, g, b)) in colors.iter().enumerate() {
            body.push_str(&format!("<span style=\"color:rgb({r},{g},{b})\">"));
            push_escaped(&mut body, grid.glyph(x as u32, y));
            body.push_str("</span>");
        }
    }
    let bg = bg_brightness;
    format!(
        "<html><body style='background-color:rgb({bg},{bg},{bg});'>\
         <pre style='font-family:monospace;'>{body}</pre></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_core::config::ConvertOptions;
    use pa_core::frame::Frame;
    use pa_core::ramp::{CharRamp, RampLut};
    use pa_core::traits::NoopProgress;

    fn render(frame: &Frame, bg: u8) -> String {
        let ramp = " &".parse::<CharRamp>().unwrap();
        let lut = RampLut::new(&ramp);
        let grid = CellGrid::compute(
            frame,
            &ConvertOptions::default(),
            &ramp,
            &lut,
            &mut NoopProgress,
        );
        emit(&grid, bg)
    }

    #[test]
    fn spans_carry_cell_colors() {
        let frame = Frame::filled(1, 1, (200, 100, 50));
        let html = render(&frame, 30);
        assert!(html.contains("color:rgb(200,100,50)"));
        assert!(html.contains("background-color:rgb(30,30,30)"));
    }

    #[test]
    fn markup_glyphs_are_escaped() {
        // Blanc → glyphe le plus dense de la rampe " &".
        let frame = Frame::filled(1, 1, (255, 255, 255));
        let html = render(&frame, 0);
        assert!(html.contains("&amp;"));
        assert!(!html.contains(">&<"));
    }

    #[test]
    fn rows_separated_by_br() {
        let frame = Frame::filled(2, 3, (0, 0, 0));
        let html = render(&frame, 0);
        assert_eq!(html.matches("<br>").count(), 2);
    }
}

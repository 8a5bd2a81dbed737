//! Émetteur raster : compose les glyphes en image RGB via leurs stencils.
//!
//! Chaque cellule peint la couleur de la cellule à travers le stencil
//! alpha de son glyphe, sur un fond gris uniforme. Les bandes de cellules
//! (une rangée de grille = `cell_h` scanlines) sont indépendantes, donc
//! composées en parallèle.

use image::RgbImage;
use rayon::prelude::*;

use pa_font::masks::GlyphAtlas;

use crate::grid::CellGrid;

/// Compose la grille en image `width × cell_w` par `height × cell_h`.
///
/// # Panics
/// Panique si les dimensions débordent la capacité d'un buffer image —
/// impossible avec des grilles issues de `grid_size` (scale ≤ 1).
#[must_use]
pub fn emit(grid: &CellGrid, atlas: &GlyphAtlas, bg_brightness: u8) -> RgbImage {
    let cell_w = atlas.cell_width() as usize;
    let cell_h = atlas.cell_height() as usize;
    let out_w = grid.width as usize * cell_w;
    let out_h = grid.height as usize * cell_h;
    let stride = out_w * 3;

    let mut buf = vec![bg_brightness; stride * out_h];
    let bg = f32::from(bg_brightness);

    buf.par_chunks_exact_mut(stride * cell_h)
        .enumerate()
        .for_each(|(gy, band)| {
            for gx in 0..grid.width as usize {
                let mask = atlas.mask(grid.glyph(gx as u32, gy as u32));
                let (r, g, b) = grid.color(gx as u32, gy as u32);
                let fg = [f32::from(r), f32::from(g), f32::from(b)];
                for my in 0..cell_h {
                    let mask_row = &mask[my * cell_w..(my + 1) * cell_w];
                    let line = &mut band[my * stride + gx * cell_w * 3..];
                    for (mx, &alpha) in mask_row.iter().enumerate() {
                        if alpha == 0 {
                            continue;
                        }
                        let a = f32::from(alpha) / 255.0;
                        for c in 0..3 {
                            let blended = fg[c].mul_add(a, bg * (1.0 - a));
                            line[mx * 3 + c] = blended as u8;
                        }
                    }
                }
            }
        });

    RgbImage::from_raw(out_w as u32, out_h as u32, buf)
        .unwrap_or_else(|| RgbImage::new(out_w as u32, out_h as u32))
}

//! Rendu d'une frame en art ASCII : tramage, grille de cellules, et les
//! quatre émetteurs (raster, texte, HTML, ANSI).
//!
//! Tous les formats partagent la même passe [`grid::CellGrid`] — le choix
//! du glyphe et de la couleur par cellule ne dépend jamais du format.

pub mod ansi;
pub mod dither;
pub mod grid;
pub mod html;
pub mod raster;
pub mod text;

use image::RgbImage;

use pa_core::config::{ConvertOptions, OutputFormat};
use pa_core::error::PicaError;
use pa_core::frame::Frame;
use pa_core::ramp::{CharRamp, RampLut};
use pa_core::traits::ProgressSink;
use pa_font::masks::GlyphAtlas;

pub use grid::CellGrid;

/// Résultat du rendu d'une frame, selon le format demandé.
pub enum Rendered {
    /// Image composée, à persister en PNG ou à assembler en GIF.
    Raster(RgbImage),
    /// Texte brut.
    Text(String),
    /// Document HTML autonome.
    Html(String),
    /// Flux ANSI pour stdout.
    Ansi(String),
}

/// Rend une frame (déjà à la résolution de grille) dans le format choisi.
///
/// L'atlas n'est requis que pour le raster — les formats textuels se
/// passent entièrement de police.
///
/// # Errors
/// `FontLoad` si le format raster est demandé sans atlas de glyphes.
pub fn render_frame(
    frame: &Frame,
    opts: &ConvertOptions,
    ramp: &CharRamp,
    lut: &RampLut,
    atlas: Option<&GlyphAtlas>,
    progress: &mut dyn ProgressSink,
) -> Result<Rendered, PicaError> {
    let grid = CellGrid::compute(frame, opts, ramp, lut, progress);
    match opts.format {
        OutputFormat::Raster => {
            let atlas = atlas.ok_or_else(|| {
                PicaError::FontLoad(
                    "aucune police disponible pour la sortie raster (--format text/html/ansi \
                     fonctionnent sans police)"
                        .to_string(),
                )
            })?;
            Ok(Rendered::Raster(raster::emit(&grid, atlas, opts.bg_brightness)))
        }
        OutputFormat::Text => Ok(Rendered::Text(text::emit(&grid))),
        OutputFormat::Html => Ok(Rendered::Html(html::emit(&grid, opts.bg_brightness))),
        OutputFormat::Ansi => Ok(Rendered::Ansi(ansi::emit(&grid))),
    }
}

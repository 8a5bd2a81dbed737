/// Chargement de polices et artefacts dérivés : la rampe de caractères
/// triée par encre (charset builder) et l'atlas de masques de glyphes
/// consommé par la sortie raster.

pub mod builder;
pub mod cache;
pub mod font;
pub mod masks;

pub use builder::{base_chars, build_ramp};
pub use cache::RampCache;
pub use font::LoadedFont;
pub use masks::{GlyphAtlas, MaskCache};

/// Types partagés de picascii : frames, rampe de caractères, luminance,
/// options de conversion, erreurs et traits collaborateurs.
///
/// Ce crate ne fait aucune I/O image ou police — il porte uniquement les
/// structures consommées par pa-font, pa-source, pa-render et pa-export.

pub mod config;
pub mod error;
pub mod frame;
pub mod luma;
pub mod ramp;
pub mod traits;

pub use config::{ConvertOptions, DitherMode, OutputFormat};
pub use error::PicaError;
pub use frame::Frame;
pub use luma::GrayscaleMode;
pub use ramp::{CharRamp, RampLut};

/// Sources de frames : images fixes, GIF animés, vidéo/webcam via ffmpeg,
/// et le resizer nearest-neighbor vers la résolution de grille.

pub mod image;
pub mod resize;
pub mod video;

pub use image::{AnimatedSource, StillSource, open_image_source};
pub use resize::{Resizer, grid_size};
pub use video::VideoSource;

//! Persistance des rendus : nommage des artefacts, assemblage GIF et
//! encodage MP4.

pub mod gif;
pub mod mp4;
pub mod naming;

pub use gif::GifAssembler;
pub use mp4::Mp4Muxer;
pub use naming::{ParsedStem, output_stem, parse_stem, video_frame_base};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Frames, ImageError};

use pa_core::error::PicaError;
use pa_core::frame::Frame;
use pa_core::traits::FrameSource;

fn map_open_error(path: &Path, e: &ImageError) -> PicaError {
    match e {
        ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            PicaError::InputNotFound {
                path: path.display().to_string(),
            }
        }
        other => PicaError::Decode(format!("{} : {other}", path.display())),
    }
}

/// Charge une image fixe en frame RGB.
///
/// # Errors
/// `InputNotFound` si le fichier manque, `Decode` sinon.
pub fn load_frame(path: &Path) -> Result<Frame, PicaError> {
    let img = image::open(path).map_err(|e| map_open_error(path, &e))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame {
        data: rgb.into_raw(),
        width,
        height,
        delay_ms: None,
    })
}

/// Source d'image fixe : produit exactement une frame.
pub struct StillSource {
    frame: Option<Frame>,
    size: (u32, u32),
}

impl StillSource {
    /// Ouvre et décode l'image.
    ///
    /// # Errors
    /// `InputNotFound` ou `Decode`.
    pub fn open(path: &Path) -> Result<Self, PicaError> {
        let frame = load_frame(path)?;
        let size = (frame.width, frame.height);
        Ok(Self {
            frame: Some(frame),
            size,
        })
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frame.take()
    }

    fn native_size(&self) -> (u32, u32) {
        self.size
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// Source GIF animée : itère les frames dans l'ordre, une à la fois,
/// avec leur durée d'affichage. Aucune frame n'est bufferisée au-delà
/// de la courante.
pub struct AnimatedSource {
    frames: Frames<'static>,
    size: (u32, u32),
}

impl AnimatedSource {
    /// Ouvre un GIF. Une frame indécodable en cours de séquence est
    /// signalée et sautée, elle n'interrompt pas les suivantes.
    ///
    /// # Errors
    /// `InputNotFound` ou `Decode` si l'en-tête même est illisible.
    pub fn open(path: &Path) -> Result<Self, PicaError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PicaError::InputNotFound {
                    path: path.display().to_string(),
                }
            } else {
                PicaError::Decode(format!("{} : {e}", path.display()))
            }
        })?;
        let decoder = GifDecoder::new(BufReader::new(file))
            .map_err(|e| PicaError::Decode(format!("{} : {e}", path.display())))?;
        let size = image::ImageDecoder::dimensions(&decoder);
        Ok(Self {
            frames: decoder.into_frames(),
            size,
        })
    }
}

impl FrameSource for AnimatedSource {
    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            match self.frames.next()? {
                Ok(frame) => {
                    let (num, den) = frame.delay().numer_denom_ms();
                    let delay_ms = if den == 0 { num } else { num / den };
                    let rgba = frame.into_buffer();
                    let (width, height) = rgba.dimensions();
                    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
                    return Some(Frame {
                        data: rgb.into_raw(),
                        width,
                        height,
                        delay_ms: Some(delay_ms.max(1)),
                    });
                }
                Err(e) => {
                    log::warn!("frame GIF illisible, sautée : {e}");
                }
            }
        }
    }

    fn native_size(&self) -> (u32, u32) {
        self.size
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// Ouvre un fichier image comme source de frames : GIF → séquence animée,
/// tout le reste → frame unique.
///
/// # Errors
/// `InputNotFound` ou `Decode`.
pub fn open_image_source(path: &Path) -> Result<Box<dyn FrameSource>, PicaError> {
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if is_gif {
        Ok(Box::new(AnimatedSource::open(path)?))
    } else {
        Ok(Box::new(StillSource::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_input_not_found() {
        let err = StillSource::open(Path::new("/nonexistent/photo.png"));
        assert!(matches!(err, Err(PicaError::InputNotFound { .. })));
    }

    #[test]
    fn corrupt_image_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png at all").unwrap();
        let err = StillSource::open(&path);
        assert!(matches!(err, Err(PicaError::Decode(_))));
    }

    #[test]
    fn still_source_yields_exactly_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.png");
        let img = image::RgbImage::from_pixel(2, 3, image::Rgb([255, 255, 255]));
        img.save(&path).unwrap();

        let mut source = StillSource::open(&path).unwrap();
        assert_eq!(source.native_size(), (2, 3));
        assert!(!source.is_live());
        let frame = source.next_frame().unwrap();
        assert_eq!((frame.width, frame.height), (2, 3));
        assert_eq!(frame.pixel(1, 2), (255, 255, 255));
        assert!(source.next_frame().is_none());
    }
}

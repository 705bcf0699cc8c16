//! Adapter for blocks that were rendered ahead of time into image files.

use super::Rasterizer;
use crate::error::RasterizeError;
use crate::model::Bitmap;
use std::path::{Path, PathBuf};

/// A pre-rendered block.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file on disk (PNG or JPEG)
    Path(PathBuf),
    /// Encoded image bytes
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Short label for log messages.
    pub fn label(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Decodes pre-rendered images into bitmaps.
///
/// Images are taken to have been rendered at the run's sample scale already,
/// so a 1110px wide capture at scale 2 is 555 nominal pixels wide.
#[derive(Debug, Clone, Default)]
pub struct ImageRasterizer {
    _private: (),
}

impl ImageRasterizer {
    /// Create a new image rasterizer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Decode encoded image bytes.
    pub fn decode(bytes: &[u8], sample_scale: f32) -> Result<Bitmap, RasterizeError> {
        let decoded = ::image::load_from_memory(bytes)?;
        normalize(decoded, sample_scale)
    }
}

fn normalize(decoded: ::image::DynamicImage, sample_scale: f32) -> Result<Bitmap, RasterizeError> {
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("decoded {}x{} image at scale {}", width, height, sample_scale);
    Bitmap::from_rgba(width, height, sample_scale, rgba.into_raw())
        .map_err(|e| RasterizeError::Malformed(e.to_string()))
}

impl Rasterizer for ImageRasterizer {
    type Block = ImageSource;

    fn rasterize(
        &mut self,
        block: &ImageSource,
        sample_scale: f32,
    ) -> Result<Bitmap, RasterizeError> {
        log::debug!("rasterizing {}", block.label());
        match block {
            ImageSource::Path(path) => {
                let bytes = std::fs::read(path)?;
                Self::decode(&bytes, sample_scale)
            }
            ImageSource::Bytes(bytes) => Self::decode(bytes, sample_scale),
        }
    }
}

#[cfg(feature = "async")]
impl super::AsyncRasterizer for ImageRasterizer {
    type Block = ImageSource;

    async fn rasterize(
        &mut self,
        block: &ImageSource,
        sample_scale: f32,
    ) -> Result<Bitmap, RasterizeError> {
        log::debug!("rasterizing {}", block.label());
        match block {
            ImageSource::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                Self::decode(&bytes, sample_scale)
            }
            ImageSource::Bytes(bytes) => Self::decode(bytes, sample_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_to_rgba() {
        let bmp = ImageRasterizer::decode(&png_bytes(3, 2), 2.0).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (3, 2));
        assert_eq!(bmp.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(bmp.pixel(1, 1), [255, 255, 255, 255]);
        assert_eq!(bmp.sample_scale(), 2.0);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let mut rasterizer = ImageRasterizer::new();
        let err = rasterizer
            .rasterize(&ImageSource::Bytes(b"not an image".to_vec()), 2.0)
            .unwrap_err();
        assert!(matches!(err, RasterizeError::Decode(_)));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let mut rasterizer = ImageRasterizer::new();
        let err = rasterizer
            .rasterize(&ImageSource::from(Path::new("/nonexistent/block.png")), 2.0)
            .unwrap_err();
        assert!(matches!(err, RasterizeError::Unreadable(_)));
    }

    #[test]
    fn test_source_label() {
        assert_eq!(
            ImageSource::from(Path::new("blocks/q1.png")).label(),
            "blocks/q1.png"
        );
        assert_eq!(ImageSource::Bytes(vec![0; 12]).label(), "<12 bytes>");
    }
}

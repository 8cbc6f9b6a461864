//! Photo loading and conversion to PDF image XObjects

use std::io::{self, Write};
use std::path::PathBuf;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{ColorType, ImageFormat};
use inspection_types::PhotoRef;

/// Source of photo bytes
///
/// The compositor never touches the filesystem directly; tests and embedders
/// can swap in their own resolver.
pub trait AssetResolver {
    fn load(&self, photo: &PhotoRef) -> io::Result<Vec<u8>>;
}

/// Resolves paths on the local filesystem and passes in-memory bytes through
#[derive(Debug, Clone, Default)]
pub struct LocalAssets {
    base_dir: Option<PathBuf>,
}

impl LocalAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir`
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }
}

impl AssetResolver for LocalAssets {
    fn load(&self, photo: &PhotoRef) -> io::Result<Vec<u8>> {
        match photo {
            PhotoRef::Bytes(bytes) => Ok(bytes.clone()),
            PhotoRef::Path(path) => match &self.base_dir {
                Some(base) if path.is_relative() => std::fs::read(base.join(path)),
                _ => std::fs::read(path),
            },
        }
    }
}

/// Image data ready to be written as an XObject stream
#[derive(Debug, Clone, PartialEq)]
pub struct PdfImage {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    pub bits_per_component: u8,
    pub filter: &'static str,
    pub data: Vec<u8>,
}

impl PdfImage {
    /// Height for a given display width, keeping the aspect ratio
    pub fn scaled_height(&self, width: f64) -> f64 {
        width * self.height as f64 / self.width as f64
    }
}

/// Decode an encoded photo
///
/// Baseline JPEGs are embedded as-is; everything else is decoded and stored
/// as flate-compressed RGB. Transparency is dropped.
pub fn decode_photo(bytes: &[u8]) -> Result<PdfImage, String> {
    let format = image::guess_format(bytes).map_err(|e| format!("unknown image format: {}", e))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| format!("cannot decode image: {}", e))?;
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err("image has no pixels".to_string());
    }

    if format == ImageFormat::Jpeg {
        let color_space = match decoded.color() {
            ColorType::L8 => Some("DeviceGray"),
            ColorType::Rgb8 => Some("DeviceRGB"),
            _ => None,
        };
        if let Some(color_space) = color_space {
            return Ok(PdfImage {
                width,
                height,
                color_space,
                bits_per_component: 8,
                filter: "DCTDecode",
                data: bytes.to_vec(),
            });
        }
    }

    let rgb = decoded.to_rgb8().into_raw();
    let data = flate_compress(&rgb).map_err(|e| format!("cannot compress image: {}", e))?;
    Ok(PdfImage {
        width,
        height,
        color_space: "DeviceRGB",
        bits_per_component: 8,
        filter: "FlateDecode",
        data,
    })
}

fn flate_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Encode a solid-color test image
    pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::encoded_image;
    use super::*;

    #[test]
    fn test_png_is_reencoded_with_flate() {
        let png = encoded_image(8, 4, ImageFormat::Png);
        let img = decode_photo(&png).unwrap();
        assert_eq!((img.width, img.height), (8, 4));
        assert_eq!(img.filter, "FlateDecode");
        assert_eq!(img.color_space, "DeviceRGB");
    }

    #[test]
    fn test_jpeg_is_passed_through() {
        let jpeg = encoded_image(16, 16, ImageFormat::Jpeg);
        let img = decode_photo(&jpeg).unwrap();
        assert_eq!(img.filter, "DCTDecode");
        assert_eq!(img.data, jpeg);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decode_photo(b"definitely not an image").is_err());
        assert!(decode_photo(&[]).is_err());
    }

    #[test]
    fn test_scaled_height_keeps_aspect() {
        let img = decode_photo(&encoded_image(40, 30, ImageFormat::Png)).unwrap();
        assert!((img.scaled_height(45.0) - 33.75).abs() < 1e-9);
    }

    #[test]
    fn test_local_assets_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo.bin"), [1u8, 2, 3]).unwrap();
        let assets = LocalAssets::with_base_dir(dir.path());
        let bytes = assets
            .load(&PhotoRef::Path(PathBuf::from("photo.bin")))
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert!(LocalAssets::new()
            .load(&PhotoRef::Path(PathBuf::from("missing/photo.jpg")))
            .is_err());
    }

    #[test]
    fn test_local_assets_passes_bytes_through() {
        let bytes = LocalAssets::new()
            .load(&PhotoRef::Bytes(vec![7, 7]))
            .unwrap();
        assert_eq!(bytes, vec![7, 7]);
    }
}

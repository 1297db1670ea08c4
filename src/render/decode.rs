//! Image decoding for bitmap descriptors.

use std::path::Path;
use std::time::Duration;

use image::DynamicImage;

use crate::error::CometaError;

/// Turns a bitmap source into pixels.
pub trait ImageDecoder: Send + Sync {
    /// Decode an image named by a URL or file path.
    fn decode_uri(&self, uri: &str) -> Result<DynamicImage, CometaError>;

    /// Decode an encoded image held in memory.
    fn decode_bytes(&self, bytes: &[u8]) -> Result<DynamicImage, CometaError> {
        image::load_from_memory(bytes)
            .map_err(|e| CometaError::Image(format!("Failed to decode image: {}", e)))
    }
}

/// Timeout for downloading a bitmap URL.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches `http(s)://` URLs over the network and reads everything else
/// (`file://` URLs, bare paths) from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultImageDecoder;

impl DefaultImageDecoder {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, CometaError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("cometa/0.1")
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| CometaError::Image(format!("HTTP client error: {}", e)))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| CometaError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(CometaError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| CometaError::Image(format!("Failed to read image data: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

impl ImageDecoder for DefaultImageDecoder {
    fn decode_uri(&self, uri: &str) -> Result<DynamicImage, CometaError> {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            let bytes = self.fetch(uri)?;
            return self.decode_bytes(&bytes);
        }

        let path = uri.strip_prefix("file://").unwrap_or(uri);
        image::open(Path::new(path))
            .map_err(|e| CometaError::Image(format!("Failed to open {}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, Luma([0])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_bytes() {
        let img = DefaultImageDecoder::default()
            .decode_bytes(&png_bytes())
            .unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = DefaultImageDecoder::default()
            .decode_bytes(b"not an image")
            .unwrap_err();
        assert!(matches!(err, CometaError::Image(_)));
    }

    #[test]
    fn test_decode_file_url() {
        let path = std::env::temp_dir().join(format!("cometa-decode-{}.png", std::process::id()));
        std::fs::write(&path, png_bytes()).unwrap();

        let uri = format!("file://{}", path.display());
        let img = DefaultImageDecoder::default().decode_uri(&uri).unwrap();
        assert_eq!(img.width(), 3);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(DefaultImageDecoder::default()
            .decode_uri("/definitely/not/here.png")
            .is_err());
    }
}

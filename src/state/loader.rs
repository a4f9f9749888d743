/// Floor plan loading
///
/// Reading and decoding run off the UI thread. Results come back as
/// `Result<_, String>` because they travel inside `Message`, which must
/// be `Clone`.

use iced::widget::image::Handle;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;

/// Raw bytes of a picked image file
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub bytes: Arc<Vec<u8>>,
}

/// A decoded floor plan ready for display
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub handle: Handle,
}

pub async fn read_image_file(path: PathBuf) -> Result<ImageFile, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(ImageFile { filename, bytes: Arc::new(bytes) })
}

/// Decode on the blocking pool, the image crate is CPU-bound
pub async fn decode_image(bytes: Arc<Vec<u8>>) -> Result<DecodedImage, String> {
    task::spawn_blocking(move || decode_image_blocking(&bytes))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

fn decode_image_blocking(bytes: &[u8]) -> Result<DecodedImage, String> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| format!("Failed to decode image: {}", e))?
        .to_rgba8();

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err("Image has no pixels".to_string());
    }

    tracing::info!(width, height, "🖼️  Decoded floor plan");

    Ok(DecodedImage {
        width,
        height,
        handle: Handle::from_rgba(width, height, img.into_raw()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_decode_png() {
        let decoded = decode_image(Arc::new(png_bytes(40, 30))).await.unwrap();
        assert_eq!((decoded.width, decoded.height), (40, 30));
    }

    #[tokio::test]
    async fn test_decode_garbage_fails() {
        let result = decode_image(Arc::new(b"not an image".to_vec())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let result = read_image_file(PathBuf::from("/nonexistent/plan.png")).await;
        assert!(result.is_err());
    }
}

use std::path::Path;

use abg_core::error::{CoreError, Result};
use abg_core::frame::FrameBuffer;

/// Charge une image depuis le disque (PNG, JPEG, BMP, GIF).
///
/// Missing files and undecodable data both fail with [`CoreError::ImageLoad`].
///
/// # Errors
/// Returns [`CoreError::ImageLoad`] if the file cannot be read or decoded.
///
/// # Example
/// ```no_run
/// use abg_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("photo.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer> {
    let img = image::open(path).map_err(|e| CoreError::ImageLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let frame = into_frame(img);
    log::info!(
        "Image chargée : {} ({}×{})",
        path.display(),
        frame.width,
        frame.height
    );
    Ok(frame)
}

/// Decode an in-memory image, format guessed from its header.
///
/// # Errors
/// Returns [`CoreError::ImageLoad`] if the bytes are not a supported image.
pub fn decode_image(bytes: &[u8]) -> Result<FrameBuffer> {
    let img = image::load_from_memory(bytes).map_err(|e| CoreError::ImageLoad {
        path: "<mémoire>".into(),
        reason: e.to_string(),
    })?;
    Ok(into_frame(img))
}

fn into_frame(img: image::DynamicImage) -> FrameBuffer {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbImage::from_pixel(4, 3, image::Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(frame.pixel(3, 2), (255, 0, 0, 255));
    }

    #[test]
    fn missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, CoreError::ImageLoad { .. }));
    }

    #[test]
    fn garbage_bytes_are_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image at all").unwrap();
        assert!(matches!(load_image(&path), Err(CoreError::ImageLoad { .. })));
        assert!(matches!(
            decode_image(b"\x00\x01\x02"),
            Err(CoreError::ImageLoad { .. })
        ));
    }
}

use crate::errors::{AppError, AppResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;

pub const MAX_DIMENSION: u32 = 512;
const JPEG_QUALITY: u8 = 80;

/// Shrinks an uploaded image so it can be embedded in a record: decode,
/// bound the longer edge to `max_dim` preserving aspect ratio, and re-encode
/// as a JPEG data URL.
pub fn shrink_to_data_url(bytes: &[u8], max_dim: u32) -> AppResult<String> {
    let decoded =
        image::load_from_memory(bytes).map_err(|error| AppError::Io(error.to_string()))?;
    let resized = if decoded.width().max(decoded.height()) > max_dim {
        decoded.resize(max_dim, max_dim, FilterType::Triangle)
    } else {
        decoded
    };

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    resized
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|error| AppError::Io(error.to_string()))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        BASE64.encode(buffer.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::{shrink_to_data_url, MAX_DIMENSION};
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 200]));
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png)
            .expect("encode png");
        buffer.into_inner()
    }

    fn decode_data_url(url: &str) -> image::DynamicImage {
        let payload = url
            .strip_prefix("data:image/jpeg;base64,")
            .expect("jpeg data url prefix");
        let bytes = BASE64.decode(payload).expect("base64 payload");
        image::load_from_memory(&bytes).expect("decode jpeg")
    }

    #[test]
    fn oversized_images_are_bounded() {
        let url = shrink_to_data_url(&png_bytes(1600, 800), MAX_DIMENSION).expect("shrink");
        let shrunk = decode_data_url(&url);
        assert_eq!(shrunk.width(), MAX_DIMENSION);
        assert!(shrunk.height() <= MAX_DIMENSION);
    }

    #[test]
    fn small_images_keep_their_dimensions() {
        let url = shrink_to_data_url(&png_bytes(100, 60), MAX_DIMENSION).expect("shrink");
        let shrunk = decode_data_url(&url);
        assert_eq!((shrunk.width(), shrunk.height()), (100, 60));
    }

    #[test]
    fn unreadable_input_is_an_error() {
        assert!(shrink_to_data_url(b"definitely not an image", MAX_DIMENSION).is_err());
    }
}

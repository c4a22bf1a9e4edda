use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use crate::{error::{AlignError, Result}, types::Bitmap};

/// Decode an encoded raster (PNG or JPEG) into an RGBA bitmap
pub fn decode(bytes: &[u8]) -> Result<Bitmap> {
    if bytes.is_empty() {
        return Err(AlignError::Decode("empty buffer".to_string()));
    }
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgba8())
}

/// Decode a `data:image/...;base64,` URL as produced by `canvas.toDataURL()`.
///
/// A bare base64 payload without the `data:` prefix is accepted too.
pub fn decode_data_url(url: &str) -> Result<Bitmap> {
    decode(&data_url_bytes(url)?)
}

/// Extract the raw bytes carried by a base64 data URL
pub fn data_url_bytes(url: &str) -> Result<Vec<u8>> {
    let payload = match url.trim().strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| AlignError::Decode("data URL without payload".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(AlignError::Decode(format!(
                    "unsupported data URL encoding: {header}"
                )));
            }
            payload
        }
        None => url.trim(),
    };

    STANDARD
        .decode(payload)
        .map_err(|e| AlignError::Decode(e.to_string()))
}

/// Encode a bitmap as PNG, for saving diff images and similar artifacts
pub fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    bitmap.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> Bitmap {
        let mut img = Bitmap::from_pixel(6, 4, Rgba([10, 20, 30, 255]));
        img.put_pixel(2, 1, Rgba([200, 0, 0, 128]));
        img
    }

    #[test]
    fn test_decode_png_is_pixel_exact() {
        let png = encode_png(&sample()).expect("Should encode");
        let decoded = decode(&png).expect("Should decode");
        assert_eq!(decoded.dimensions(), (6, 4));
        assert_eq!(decoded.get_pixel(2, 1), &Rgba([200, 0, 0, 128]));
        assert_eq!(decoded.as_raw().len(), 6 * 4 * 4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode(b"not an image"), Err(AlignError::Decode(_))));
        assert!(matches!(decode(&[]), Err(AlignError::Decode(_))));
    }

    #[test]
    fn test_decode_data_url() {
        let png = encode_png(&sample()).expect("Should encode");
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let decoded = decode_data_url(&url).expect("Should decode data URL");
        assert_eq!(decoded, sample());

        let bare = decode_data_url(&STANDARD.encode(&png)).expect("Should decode bare payload");
        assert_eq!(bare, sample());
    }

    #[test]
    fn test_data_url_errors() {
        assert!(matches!(
            data_url_bytes("data:image/png;base64"),
            Err(AlignError::Decode(_))
        ));
        assert!(matches!(
            data_url_bytes("data:text/plain,hello"),
            Err(AlignError::Decode(_))
        ));
        assert!(matches!(
            data_url_bytes("data:image/png;base64,@@@"),
            Err(AlignError::Decode(_))
        ));
    }
}

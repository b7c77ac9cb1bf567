use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{DeckError, DeckResult};

/// Decode encoded image bytes (PNG/JPEG).
pub fn decode_image(bytes: &[u8]) -> DeckResult<image::DynamicImage> {
    let img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(img)
}

/// Open and decode an image file. Failures map to [`DeckError::ImageDecode`].
pub fn open_image(path: &Path) -> DeckResult<image::DynamicImage> {
    image::ImageReader::open(path)
        .map_err(|e| DeckError::image_decode(path, e))?
        .with_guessed_format()
        .map_err(|e| DeckError::image_decode(path, e))?
        .decode()
        .map_err(|e| DeckError::image_decode(path, e))
}

/// Read pixel dimensions from the image header without decoding pixels.
pub fn probe_dimensions(path: &Path) -> DeckResult<(u32, u32)> {
    let (w, h) = image::image_dimensions(path).map_err(|e| DeckError::image_decode(path, e))?;
    if w == 0 || h == 0 {
        return Err(DeckError::image_decode(path, "zero-sized image"));
    }
    Ok((w, h))
}

/// Encode `img` as PNG at `path`.
pub fn write_png(img: &image::RgbaImage, path: &Path) -> DeckResult<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Convert premultiplied RGBA8 (as produced by tiny-skia) back to straight alpha.
pub fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

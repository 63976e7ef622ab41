//! Image encoding: `DynamicImage` → base64 JPEG wrapped in [`PageImage`].
//!
//! Gazette annexes are greyscale scans of typeset text; at 2× render scale a
//! quality-95 JPEG keeps the glyph edges clean while staying a fraction of the
//! PNG size, which matters when every page of a document goes into one
//! request.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// Media type declared for every page image.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// One rasterised page, ready to embed in a request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Declared media type, always [`JPEG_MEDIA_TYPE`] for rendered pages.
    pub media_type: String,
    /// Base64 (standard alphabet, padded) image bytes.
    pub data: String,
}

impl PageImage {
    /// Wrap already base64-encoded JPEG data.
    pub fn jpeg(data: String) -> Self {
        Self {
            media_type: JPEG_MEDIA_TYPE.to_string(),
            data,
        }
    }
}

/// Encode a rasterised page as a base64 JPEG.
///
/// pdfium hands back RGBA bitmaps; JPEG has no alpha channel so the image is
/// flattened to RGB first.
pub fn encode_page(img: &DynamicImage, quality: u8) -> Result<PageImage, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} page → {} bytes JPEG, {} bytes base64",
        rgb.width(),
        rgb.height(),
        buf.len(),
        b64.len()
    );

    Ok(PageImage::jpeg(b64))
}

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("uploaded file is not a readable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Identifies one image load. Higher tokens were issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PreviewToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    Shown,
    /// A newer load was started before this one finished; the preview was left alone
    Stale,
}

/// A decoded image ready to be placed in `#image_preview`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    data_url: String,
}

impl DecodedImage {
    pub fn to_html(&self) -> String {
        format!("<img src=\"{}\" alt=\"Pasted Image\"/>", self.data_url)
    }
}

/// Decodes raw upload bytes. Runs without touching any shared state, so
/// callers can do it off the request thread.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, PreviewError> {
    let format = image::guess_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format)?;
    let mime = mime_for(format);
    Ok(DecodedImage {
        mime,
        width: img.width(),
        height: img.height(),
        data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
    })
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Preview pane state. Only the most recently started load may update it.
#[derive(Debug, Default)]
pub struct ImagePreview {
    issued: u64,
    shown: Option<DecodedImage>,
}

impl ImagePreview {
    pub fn begin(&mut self) -> PreviewToken {
        self.issued += 1;
        PreviewToken(self.issued)
    }

    pub fn is_latest(&self, token: PreviewToken) -> bool {
        token.0 == self.issued
    }

    pub fn complete(&mut self, token: PreviewToken, image: DecodedImage) -> PreviewOutcome {
        if !self.is_latest(token) {
            return PreviewOutcome::Stale;
        }
        self.shown = Some(image);
        PreviewOutcome::Shown
    }

    /// Inner HTML of `#image_preview`, empty until an image has been shown
    pub fn to_html(&self) -> String {
        self.shown.as_ref().map(DecodedImage::to_html).unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb([200u8, 180, 150]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_into_data_url() {
        let decoded = decode_image(&png_bytes(3, 2)).unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!((decoded.width, decoded.height), (3, 2));
        let html = decoded.to_html();
        assert!(html.starts_with("<img src=\"data:image/png;base64,iVBORw0KGgo"));
        assert!(html.ends_with("alt=\"Pasted Image\"/>"));
    }

    #[test]
    fn rejects_non_images() {
        assert!(decode_image(b"%PDF-1.4 not an image").is_err());
        assert!(decode_image(&[]).is_err());
    }

    #[test]
    fn later_load_wins_even_if_it_finishes_first() {
        let mut preview = ImagePreview::default();
        let first = preview.begin();
        let second = preview.begin();

        let small = decode_image(&png_bytes(2, 2)).unwrap();
        let large = decode_image(&png_bytes(5, 5)).unwrap();

        assert_eq!(preview.complete(second, small.clone()), PreviewOutcome::Shown);
        assert_eq!(preview.complete(first, large), PreviewOutcome::Stale);
        assert_eq!(preview.to_html(), small.to_html());
    }

    #[test]
    fn failed_decode_keeps_previous_preview() {
        let mut preview = ImagePreview::default();
        let first = preview.begin();
        preview.complete(first, decode_image(&png_bytes(2, 2)).unwrap());
        let before = preview.to_html();

        // a failed decode never reaches `complete`
        let _second = preview.begin();
        assert!(decode_image(b"garbage").is_err());
        assert_eq!(preview.to_html(), before);
    }

    #[test]
    fn empty_until_first_image() {
        let preview = ImagePreview::default();
        assert_eq!(preview.to_html(), "");
    }
}

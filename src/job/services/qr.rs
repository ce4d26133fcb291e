//! QR code rendering for result links.

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;
use thiserror::Error;

/// Failure to render a QR code image.
#[derive(Debug, Clone, Error)]
#[error("failed to render qr code: {0}")]
pub struct QrRenderError(String);

/// Renders `url` as a black-on-white PNG QR code with a quiet zone.
pub(crate) fn render_png(url: &str) -> Result<Vec<u8>, QrRenderError> {
    let code = QrCode::new(url.as_bytes()).map_err(|err| QrRenderError(err.to_string()))?;
    let modules = code.render::<Luma<u8>>().quiet_zone(true).build();
    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(modules)
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| QrRenderError(err.to_string()))?;
    Ok(png.into_inner())
}

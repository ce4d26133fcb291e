//! Image-normalising decorator around any [`ImageTransformer`].
//!
//! Sources are orientation-corrected and downscaled before they are sent
//! upstream, and results are re-encoded to match the configured output
//! format. Undecodable images are passed through untouched so a strange
//! upload never fails a job on its own.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader, ImageResult};
use std::io::Cursor;

use crate::artifact::domain::OutputFormat;
use crate::job::ports::{ImageTransformError, ImageTransformer};

/// Leading bytes of every JPEG stream.
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Normalisation parameters taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationSettings {
    /// Longest side, in pixels, of the image sent upstream.
    pub source_max_side: u32,
    /// JPEG quality used when re-encoding the source.
    pub source_jpeg_quality: u8,
    /// Encoding of stored results.
    pub result_format: OutputFormat,
    /// JPEG quality used when converting results.
    pub result_jpeg_quality: u8,
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        Self {
            source_max_side: 1280,
            source_jpeg_quality: 85,
            result_format: OutputFormat::Jpeg,
            result_jpeg_quality: 85,
        }
    }
}

/// Wraps a transformer with source preparation and result conversion.
#[derive(Debug, Clone)]
pub struct NormalizingTransformer<T> {
    inner: T,
    settings: NormalizationSettings,
}

impl<T> NormalizingTransformer<T>
where
    T: ImageTransformer,
{
    /// Creates a normalising decorator.
    #[must_use]
    pub const fn new(inner: T, settings: NormalizationSettings) -> Self {
        Self { inner, settings }
    }

    /// Returns the wrapped transformer.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T> ImageTransformer for NormalizingTransformer<T>
where
    T: ImageTransformer,
{
    async fn transform(
        &self,
        model: &str,
        prompt: &str,
        image: Vec<u8>,
    ) -> Result<Vec<u8>, ImageTransformError> {
        let settings = self.settings;
        let prepared = run_blocking(move || prepare_source(image, settings)).await?;
        let output = self.inner.transform(model, prompt, prepared).await?;
        if settings.result_format != OutputFormat::Jpeg {
            return Ok(output);
        }
        run_blocking(move || convert_result_to_jpeg(output, settings.result_jpeg_quality)).await
    }
}

async fn run_blocking<F>(f: F) -> Result<Vec<u8>, ImageTransformError>
where
    F: FnOnce() -> Vec<u8> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ImageTransformError::Processing(err.to_string()))
}

/// Orients and downscales a source photo.
///
/// A JPEG that already fits is returned unchanged.
pub(crate) fn prepare_source(bytes: Vec<u8>, settings: NormalizationSettings) -> Vec<u8> {
    match try_prepare_source(&bytes, settings) {
        Ok(Some(prepared)) => prepared,
        Ok(None) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to preprocess source image, sending original bytes");
            bytes
        }
    }
}

fn try_prepare_source(
    bytes: &[u8],
    settings: NormalizationSettings,
) -> ImageResult<Option<Vec<u8>>> {
    let decoded = decode_oriented(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    let needs_resize = width.max(height) > settings.source_max_side;
    if !needs_resize && bytes.starts_with(JPEG_MAGIC) {
        return Ok(None);
    }

    let normalized = if needs_resize {
        decoded.resize(
            settings.source_max_side,
            settings.source_max_side,
            FilterType::Lanczos3,
        )
    } else {
        decoded
    };
    let prepared = encode_jpeg(&normalized, settings.source_jpeg_quality)?;
    tracing::info!(
        from_width = width,
        from_height = height,
        to_width = normalized.width(),
        to_height = normalized.height(),
        from_bytes = bytes.len(),
        to_bytes = prepared.len(),
        "prepared source image"
    );
    Ok(Some(prepared))
}

/// Re-encodes a generated image as JPEG. JPEG input is returned unchanged.
pub(crate) fn convert_result_to_jpeg(bytes: Vec<u8>, quality: u8) -> Vec<u8> {
    if bytes.starts_with(JPEG_MAGIC) {
        return bytes;
    }
    let converted = decode_oriented(&bytes).and_then(|decoded| encode_jpeg(&decoded, quality));
    match converted {
        Ok(jpeg) => jpeg,
        Err(err) => {
            tracing::warn!(error = %err, "failed to convert generated image to JPEG, storing original bytes");
            bytes
        }
    }
}

fn decode_oriented(bytes: &[u8]) -> ImageResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut decoded = DynamicImage::from_decoder(decoder)?;
    decoded.apply_orientation(orientation);
    Ok(decoded)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut output = Vec::new();
    image
        .to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut output, quality))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    //! Unit tests for source preparation and result conversion.

    use super::{NormalizationSettings, convert_result_to_jpeg, prepare_source};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use rstest::rstest;
    use std::io::Cursor;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut output = Cursor::new(Vec::new());
        image.write_to(&mut output, format).expect("encode image");
        output.into_inner()
    }

    fn dimensions(bytes: &[u8]) -> (u32, u32) {
        let decoded = image::load_from_memory(bytes).expect("decode image");
        (decoded.width(), decoded.height())
    }

    #[rstest]
    fn large_source_is_downscaled_to_max_side() {
        let source = encoded(2800, 1900, ImageFormat::Jpeg);

        let prepared = prepare_source(source, NormalizationSettings::default());

        let (width, height) = dimensions(&prepared);
        assert_eq!(width, 1280);
        assert!(height < 1280);
        assert_eq!(
            image::guess_format(&prepared).expect("format"),
            ImageFormat::Jpeg
        );
    }

    #[rstest]
    fn small_jpeg_source_passes_through() {
        let source = encoded(640, 480, ImageFormat::Jpeg);

        let prepared = prepare_source(source.clone(), NormalizationSettings::default());

        assert_eq!(prepared, source);
    }

    #[rstest]
    fn small_png_source_is_reencoded_as_jpeg() {
        let source = encoded(64, 48, ImageFormat::Png);

        let prepared = prepare_source(source, NormalizationSettings::default());

        assert_eq!(
            image::guess_format(&prepared).expect("format"),
            ImageFormat::Jpeg
        );
        assert_eq!(dimensions(&prepared), (64, 48));
    }

    #[rstest]
    #[case(b"not an image".to_vec())]
    #[case(Vec::new())]
    fn undecodable_input_passes_through(#[case] bytes: Vec<u8>) {
        assert_eq!(
            prepare_source(bytes.clone(), NormalizationSettings::default()),
            bytes
        );
        assert_eq!(convert_result_to_jpeg(bytes.clone(), 85), bytes);
    }

    #[rstest]
    fn png_result_is_converted_to_jpeg() {
        let result = encoded(32, 32, ImageFormat::Png);

        let converted = convert_result_to_jpeg(result, 85);

        assert_eq!(
            image::guess_format(&converted).expect("format"),
            ImageFormat::Jpeg
        );
    }
}

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::application::ports::{CompressedPayload, CompressionError, PayloadCompressor};
use crate::domain::SupportedFileType;

const DEFAULT_JPEG_QUALITY: u8 = 80;
const DEFAULT_SCALE_STEP: f32 = 0.75;
const DEFAULT_MAX_ROUNDS: u32 = 6;

/// Re-encodes images as JPEG, shrinking them step by step until they fit.
/// PDFs are passed through untouched since they cannot be re-encoded here.
#[derive(Debug, Clone, Copy)]
pub struct ImagePayloadCompressor {
    quality: u8,
    scale_step: f32,
    max_rounds: u32,
}

impl ImagePayloadCompressor {
    pub fn new(quality: u8, scale_step: f32, max_rounds: u32) -> Self {
        Self {
            quality,
            scale_step,
            max_rounds,
        }
    }
}

impl Default for ImagePayloadCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY, DEFAULT_SCALE_STEP, DEFAULT_MAX_ROUNDS)
    }
}

impl PayloadCompressor for ImagePayloadCompressor {
    fn compress(
        &self,
        data: &[u8],
        file_type: SupportedFileType,
        limit: usize,
    ) -> Result<CompressedPayload, CompressionError> {
        if !file_type.is_image() {
            return Ok(CompressedPayload {
                data: data.to_vec(),
                mime: file_type.as_mime().to_string(),
            });
        }

        let mut image = image::load_from_memory(data)
            .map_err(|e| CompressionError::Decode(e.to_string()))?;
        let mut best = encode_jpeg(&image, self.quality)?;

        for round in 1..=self.max_rounds {
            if best.len() <= limit {
                break;
            }

            let width = ((image.width() as f32) * self.scale_step) as u32;
            let height = ((image.height() as f32) * self.scale_step) as u32;
            if width == 0 || height == 0 {
                break;
            }

            image = image.resize(width, height, FilterType::Triangle);
            let encoded = encode_jpeg(&image, self.quality)?;
            tracing::debug!(
                round,
                width,
                height,
                bytes = encoded.len(),
                "Downscaled image payload"
            );
            if encoded.len() < best.len() {
                best = encoded;
            }
        }

        Ok(CompressedPayload {
            data: best,
            mime: SupportedFileType::Jpeg.as_mime().to_string(),
        })
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| CompressionError::Encode(e.to_string()))?;
    Ok(out)
}

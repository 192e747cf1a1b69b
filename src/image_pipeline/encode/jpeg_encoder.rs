use image::{ExtendedColorType, RgbImage};
use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::encode::encoder::FrameEncoder;
use crate::image_pipeline::encode::types::{DEFAULT_JPEG_QUALITY, EncodedFrame, OutputFormat};

/// Largest side a baseline JPEG can describe.
const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

#[derive(Debug, Clone, Copy)]
pub struct JpegFrameEncoder {
    quality: u8,
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl JpegFrameEncoder {
    /// `quality` is 1..=100; the pipeline config rejects anything else.
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, image: &RgbImage) -> Result<EncodedFrame> {
        let (width, height) = image.dimensions();
        debug!("Encoding JPEG image: {}x{} q{}", width, height, self.quality);

        if width == 0 || height == 0 || width > MAX_JPEG_DIMENSION || height > MAX_JPEG_DIMENSION {
            return Err(PipelineError::EncodingFailure(format!(
                "cannot encode {}x{} image as JPEG",
                width, height
            )));
        }

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.quality)
            .encode(image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| PipelineError::EncodingFailure(e.to_string()))?;

        debug!("JPEG encoding complete, {} bytes", buffer.len());
        Ok(EncodedFrame::new(
            buffer,
            width,
            height,
            OutputFormat::Jpeg {
                quality: self.quality,
            },
        ))
    }
}

//! Output encoding module
//!
//! Serializes the color-mapped mosaic into a compressed image byte stream.

mod encoder;
mod jpeg_encoder;
mod tiff_encoder;
pub mod types;

pub use encoder::FrameEncoder;
pub use jpeg_encoder::JpegFrameEncoder;
pub use tiff_encoder::TiffFrameEncoder;
pub use types::{DEFAULT_JPEG_QUALITY, EncodedFrame, OutputFormat, TiffCompression};

use image::RgbImage;

use crate::image_pipeline::common::error::Result;

/// Encoder selected from an [`OutputFormat`].
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredEncoder {
    Jpeg(JpegFrameEncoder),
    Tiff(TiffFrameEncoder),
}

impl ConfiguredEncoder {
    pub fn from_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpeg { quality } => Self::Jpeg(JpegFrameEncoder::new(quality)),
            OutputFormat::Tiff(compression) => Self::Tiff(TiffFrameEncoder::new(compression)),
        }
    }
}

impl FrameEncoder for ConfiguredEncoder {
    fn encode(&self, image: &RgbImage) -> Result<EncodedFrame> {
        match self {
            Self::Jpeg(encoder) => encoder.encode(image),
            Self::Tiff(encoder) => encoder.encode(image),
        }
    }
}

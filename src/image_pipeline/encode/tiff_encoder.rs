use std::io::Cursor;

use image::RgbImage;
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::encode::encoder::FrameEncoder;
use crate::image_pipeline::encode::types::{EncodedFrame, OutputFormat, TiffCompression};

#[derive(Debug, Clone, Copy)]
pub struct TiffFrameEncoder {
    compression: TiffCompression,
}

impl TiffFrameEncoder {
    pub fn new(compression: TiffCompression) -> Self {
        Self { compression }
    }
}

impl FrameEncoder for TiffFrameEncoder {
    fn encode(&self, image: &RgbImage) -> Result<EncodedFrame> {
        let (width, height) = image.dimensions();
        debug!("Encoding TIFF image: {}x{} {:?}", width, height, self.compression);

        if width == 0 || height == 0 {
            return Err(PipelineError::EncodingFailure(format!(
                "cannot encode {}x{} image as TIFF",
                width, height
            )));
        }

        let (compression, predictor) = match self.compression {
            TiffCompression::None => (Compression::Uncompressed, Predictor::None),
            TiffCompression::Lzw => (Compression::Lzw, Predictor::Horizontal),
            TiffCompression::Deflate => (Compression::Deflate(DeflateLevel::Fast), Predictor::Horizontal),
        };

        let mut buffer = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
                .map_err(|e| PipelineError::EncodingFailure(e.to_string()))?
                .with_compression(compression)
                .with_predictor(predictor);

            encoder
                .write_image::<colortype::RGB8>(width, height, image.as_raw())
                .map_err(|e| PipelineError::EncodingFailure(e.to_string()))?;
        }

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(EncodedFrame::new(
            buffer,
            width,
            height,
            OutputFormat::Tiff(self.compression),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tiff::decoder::{Decoder, DecodingResult};

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = ((y * width + x) % 256) as u8;
            Rgb([v, v, v])
        })
    }

    #[test]
    fn roundtrips_losslessly() {
        for compression in [TiffCompression::None, TiffCompression::Lzw, TiffCompression::Deflate] {
            let image = gradient(12, 5);
            let encoded = TiffFrameEncoder::new(compression).encode(&image).unwrap();
            assert_eq!(encoded.format().mime_type(), "image/tiff");

            let mut decoder = Decoder::new(Cursor::new(encoded.bytes())).unwrap();
            assert_eq!(decoder.dimensions().unwrap(), (12, 5));
            match decoder.read_image().unwrap() {
                DecodingResult::U8(data) => assert_eq!(&data, image.as_raw()),
                _ => panic!("expected 8-bit samples for {compression:?}"),
            }
        }
    }

    #[test]
    fn empty_image_is_encoding_failure() {
        let err = TiffFrameEncoder::new(TiffCompression::Lzw)
            .encode(&RgbImage::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, PipelineError::EncodingFailure(_)));
    }
}

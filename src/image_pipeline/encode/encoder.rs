use image::RgbImage;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::encode::types::EncodedFrame;

pub trait FrameEncoder {
    fn encode(&self, image: &RgbImage) -> Result<EncodedFrame>;
}

use image::Rgb;
use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::stop::StopHandle;
use crate::image_pipeline::frame::source::{CaptureConfig, FrameSource};
use crate::image_pipeline::frame::types::{Frame, reset_frame};

/// Deterministic test pattern standing in for a camera.
///
/// The NIR channel is a horizontal ramp that drifts one step per frame, green
/// is a vertical ramp and blue a diagonal one, so both indices vary across the
/// image.
pub struct SyntheticSource {
    config: CaptureConfig,
    remaining: Option<usize>,
    produced: usize,
}

impl SyntheticSource {
    /// Endless feed.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            remaining: None,
            produced: 0,
        }
    }

    /// Feed that ends after `count` frames.
    pub fn with_count(config: CaptureConfig, count: usize) -> Self {
        Self {
            config,
            remaining: Some(count),
            produced: 0,
        }
    }

    pub fn produced(&self) -> usize {
        self.produced
    }
}

impl FrameSource for SyntheticSource {
    fn start(&mut self, stop: &StopHandle) -> Result<()> {
        if !self.config.warmup.is_zero() {
            debug!("Synthetic warm-up {:?}", self.config.warmup);
            if stop.wait_timeout(self.config.warmup) {
                debug!("Warm-up interrupted by stop request");
            }
        }
        Ok(())
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(false);
            }
            *remaining -= 1;
        }

        let (width, height) = (self.config.width, self.config.height);
        let drift = self.produced as u64;
        reset_frame(frame, width, height);

        for (x, y, px) in frame.enumerate_pixels_mut() {
            let (x, y) = (x as u64, y as u64);
            let (w, h) = (width as u64, height as u64);
            *px = Rgb([ramp(x + drift, w), ramp(y, h), ramp(x + y, w + h)]);
        }

        self.produced += 1;
        Ok(true)
    }

    fn close(&mut self) {
        self.remaining = Some(0);
    }
}

fn ramp(position: u64, span: u64) -> u8 {
    ((position % span.max(1)) * 255 / span.max(1)) as u8
}

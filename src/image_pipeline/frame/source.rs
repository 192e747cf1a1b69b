use std::time::Duration;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::stop::StopHandle;
use crate::image_pipeline::frame::types::Frame;

/// A blocking capture feed.
///
/// The stream calls [`start`](FrameSource::start) once, then
/// [`read_frame`](FrameSource::read_frame) until it returns `Ok(false)` or an
/// error, then [`close`](FrameSource::close) exactly once. If a stop is
/// requested before the first pull, `start` is skipped and only `close` runs.
pub trait FrameSource {
    /// Blocks until the device is ready to deliver frames (warm-up).
    ///
    /// Waits should go through [`StopHandle::wait_timeout`] so that a stop
    /// request cuts them short; the stream checks the handle again before
    /// the first read.
    fn start(&mut self, _stop: &StopHandle) -> Result<()> {
        Ok(())
    }

    /// Fills `frame` with the next capture.
    ///
    /// Returns `Ok(false)` when the feed is exhausted. The buffer is owned by
    /// the caller and reused across calls, so implementations should size it
    /// with [`reset_frame`](crate::image_pipeline::frame::reset_frame) rather
    /// than replace it.
    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool>;

    /// Releases the device.
    fn close(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn start(&mut self, stop: &StopHandle) -> Result<()> {
        (**self).start(stop)
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        (**self).read_frame(frame)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Settings a capture source consumes once at startup.
///
/// Every bundled source honours `warmup` in [`FrameSource::start`].
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target frame width in pixels
    pub width: u32,
    /// Target frame height in pixels
    pub height: u32,
    /// Time to let the sensor settle before the first frame
    pub warmup: Duration,
}

/// Default capture height; the width keeps the sensor's 4:3 aspect.
const DEFAULT_HEIGHT: u32 = 400;

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: (DEFAULT_HEIGHT as f64 * 1.33) as u32,
            height: DEFAULT_HEIGHT,
            warmup: Duration::from_secs(3),
        }
    }
}

impl CaptureConfig {
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }
}

/// Builder for CaptureConfig
#[derive(Default)]
pub struct CaptureConfigBuilder {
    resolution: Option<(u32, u32)>,
    warmup: Option<Duration>,
}

impl CaptureConfigBuilder {
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    pub fn warmup(mut self, warmup: Duration) -> Self {
        self.warmup = Some(warmup);
        self
    }

    pub fn build(self) -> CaptureConfig {
        let default = CaptureConfig::default();
        let (width, height) = self.resolution.unwrap_or((default.width, default.height));
        CaptureConfig {
            width,
            height,
            warmup: self.warmup.unwrap_or(default.warmup),
        }
    }
}

use std::time::Duration;

use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::stop::StopHandle;
use crate::image_pipeline::frame::source::FrameSource;
use crate::image_pipeline::frame::types::{Frame, copy_frame};

/// Adapts any iterator of captures, such as frames pushed by an external
/// camera driver, into a [`FrameSource`].
pub struct IterSource<I> {
    frames: I,
    warmup: Duration,
    closed: bool,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Result<Frame>>,
{
    pub fn new(frames: I) -> Self {
        Self {
            frames,
            warmup: Duration::ZERO,
            closed: false,
        }
    }

    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }
}

/// Source over already-captured frames.
pub fn from_frames(frames: Vec<Frame>) -> IterSource<impl Iterator<Item = Result<Frame>>> {
    IterSource::new(frames.into_iter().map(Ok))
}

impl<I> FrameSource for IterSource<I>
where
    I: Iterator<Item = Result<Frame>>,
{
    fn start(&mut self, stop: &StopHandle) -> Result<()> {
        if !self.warmup.is_zero() {
            debug!("Warming up for {:?}", self.warmup);
            stop.wait_timeout(self.warmup);
        }
        Ok(())
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        match self.frames.next() {
            Some(next) => {
                copy_frame(frame, &next?);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::common::error::PipelineError;
    use std::time::Instant;

    #[test]
    fn yields_frames_then_ends() {
        let mut source = from_frames(vec![Frame::new(2, 2), Frame::new(3, 1)]);
        let mut buffer = Frame::new(0, 0);

        assert!(source.read_frame(&mut buffer).unwrap());
        assert_eq!(buffer.dimensions(), (2, 2));
        assert!(source.read_frame(&mut buffer).unwrap());
        assert_eq!(buffer.dimensions(), (3, 1));
        assert!(!source.read_frame(&mut buffer).unwrap());
    }

    #[test]
    fn propagates_capture_errors() {
        let frames = vec![Err(PipelineError::CaptureFailure("sensor timeout".into()))];
        let mut source = IterSource::new(frames.into_iter());
        let mut buffer = Frame::new(0, 0);

        let err = source.read_frame(&mut buffer).unwrap_err();
        assert!(matches!(err, PipelineError::CaptureFailure(_)));
    }

    #[test]
    fn closed_source_is_exhausted() {
        let mut source = from_frames(vec![Frame::new(1, 1)]);
        source.close();
        assert!(!source.read_frame(&mut Frame::new(0, 0)).unwrap());
    }

    #[test]
    fn warmup_cut_short_by_stop() {
        let mut source = from_frames(Vec::new()).with_warmup(Duration::from_secs(30));
        let stop = StopHandle::new();
        stop.stop();

        let start = Instant::now();
        source.start(&stop).unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}

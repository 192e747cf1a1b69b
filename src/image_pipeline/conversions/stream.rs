//! Continuous capture loop, exposed as a pull-based iterator.

use std::iter::FusedIterator;

use tracing::{debug, error, info, trace, warn};

use crate::image_pipeline::{
    common::{PipelineTimings, Result, StopHandle},
    conversions::{ndvi_pipeline::NdviPipeline, types::CaptureRetry},
    encode::{ConfiguredEncoder, EncodedFrame, FrameEncoder},
    frame::{Frame, FrameSource, clear_frame},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Source not started yet
    Idle,
    /// Pulling frames
    Streaming,
    /// Source released; the stream yields nothing more
    Closed,
}

/// Yields one encoded frame per captured frame until the source is
/// exhausted, fails, or a stop is requested.
///
/// A stop request is observed before the source is started, cuts short its
/// warm-up and any retry backoff, and is checked again before every capture.
/// A frame already in flight is always finished.
///
/// The source is started on the first pull and closed exactly once: on end
/// of stream, on the first error, on stop, or when the stream is dropped.
/// After an error the stream is closed and returns `None`.
pub struct FrameStream<S: FrameSource, E: FrameEncoder = ConfiguredEncoder> {
    source: S,
    pipeline: NdviPipeline<E>,
    state: StreamState,
    /// Capture buffer reused across iterations, never handed out.
    buffer: Frame,
    stop: StopHandle,
    frames_emitted: u64,
    last_timings: Option<PipelineTimings>,
}

impl<S: FrameSource, E: FrameEncoder> FrameStream<S, E> {
    pub fn new(source: S, pipeline: NdviPipeline<E>) -> Self {
        Self {
            source,
            pipeline,
            state: StreamState::Idle,
            buffer: Frame::new(0, 0),
            stop: StopHandle::default(),
            frames_emitted: 0,
            last_timings: None,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Stage timings of the most recent frame.
    pub fn last_timings(&self) -> Option<&PipelineTimings> {
        self.last_timings.as_ref()
    }

    pub fn pipeline(&self) -> &NdviPipeline<E> {
        &self.pipeline
    }

    #[cfg(test)]
    pub(crate) fn buffer_capacity(&self) -> usize {
        self.buffer.as_raw().capacity()
    }

    fn close(&mut self) {
        if self.state == StreamState::Closed {
            return;
        }
        self.source.close();
        self.state = StreamState::Closed;
        info!("Stream closed after {} frames", self.frames_emitted);
    }

    fn read_with_retry(&mut self) -> Result<bool> {
        let mut attempt = 0;
        loop {
            match self.source.read_frame(&mut self.buffer) {
                Ok(has_frame) => return Ok(has_frame),
                Err(e) => match self.pipeline.config().capture_retry {
                    CaptureRetry::Retry {
                        max_attempts,
                        backoff,
                    } if attempt < max_attempts && !self.stop.is_stopped() => {
                        attempt += 1;
                        warn!("Capture failed ({}), retry {}/{}", e, attempt, max_attempts);
                        if self.stop.wait_timeout(backoff) {
                            debug!("Stop requested during retry backoff");
                            return Ok(false);
                        }
                    }
                    _ => return Err(e),
                },
            }
        }
    }

    fn next_frame(&mut self) -> Result<Option<EncodedFrame>> {
        match self.state {
            StreamState::Closed => return Ok(None),
            StreamState::Idle => {
                if self.stop.is_stopped() {
                    debug!("Stop requested before capture started");
                    return Ok(None);
                }
                info!("Starting capture");
                self.source.start(&self.stop)?;
                self.state = StreamState::Streaming;
            }
            StreamState::Streaming => {}
        }

        if self.stop.is_stopped() {
            debug!("Stop requested");
            return Ok(None);
        }

        if !self.read_with_retry()? {
            debug!("Capture source exhausted");
            return Ok(None);
        }

        let result = self.pipeline.process_with_timings(&self.buffer);
        clear_frame(&mut self.buffer);
        let (encoded, timings) = result?;

        self.frames_emitted += 1;
        trace!(
            frame = self.frames_emitted,
            "Stage timings: {:?}",
            timings.steps()
        );
        self.last_timings = Some(timings);
        Ok(Some(encoded))
    }
}

impl<S: FrameSource, E: FrameEncoder> Iterator for FrameStream<S, E> {
    type Item = Result<EncodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_frame() {
            Ok(Some(encoded)) => Some(Ok(encoded)),
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                error!("Stream failed: {}", e);
                self.close();
                Some(Err(e))
            }
        }
    }
}

impl<S: FrameSource, E: FrameEncoder> FusedIterator for FrameStream<S, E> {}

impl<S: FrameSource, E: FrameEncoder> Drop for FrameStream<S, E> {
    fn drop(&mut self) {
        self.close();
    }
}

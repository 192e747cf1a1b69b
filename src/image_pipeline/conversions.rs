//! Pipeline conversions module
//!
//! Orchestrates the per-frame NDVI conversion and the continuous stream
//! built on top of it.

mod ndvi_pipeline;
mod stream;
pub mod types;


pub use ndvi_pipeline::NdviPipeline;
pub use stream::{FrameStream, StreamState};
pub use types::{CaptureRetry, DEFAULT_LABELS, PipelineConfig, PipelineConfigBuilder};

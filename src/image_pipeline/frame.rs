//! Frame capture module
//!
//! Image types and the sources that feed raw captures into the pipeline.

mod iter_source;
mod raw_file_source;
mod source;
mod synthetic_source;
pub mod types;

pub use iter_source::{IterSource, from_frames};
pub use raw_file_source::{RawFileSource, RawMosaic, decode_raw};
pub use source::{CaptureConfig, CaptureConfigBuilder, FrameSource};
pub use synthetic_source::SyntheticSource;
pub use types::{
    Band, Channel, Frame, IndexImage, Mosaic, clear_frame, copy_frame, ensure_same_shape,
    extract_band, frame_from_bands, frame_from_vec, reset_frame,
};

//! Image processing pipeline module
//!
//! Turns a continuous feed of two-band (visible + NIR) captures into
//! pseudo-colored vegetation-index mosaics, one encoded image per frame.

pub mod common;
pub mod conversions;
pub mod encode;
pub mod frame;
pub mod processing;

pub use common::{
    PipelineError,
    PipelineTimings,
    Result,
    StopHandle,
};

pub use frame::{
    Band,
    CaptureConfig,
    Channel,
    Frame,
    FrameSource,
    IndexImage,
    IterSource,
    Mosaic,
    RawFileSource,
    SyntheticSource,
    extract_band,
    frame_from_bands,
    frame_from_vec,
};

pub use encode::{
    EncodedFrame,
    FrameEncoder,
    OutputFormat,
    TiffCompression,
};

pub use conversions::{
    CaptureRetry,
    FrameStream,
    NdviPipeline,
    PipelineConfig,
    StreamState,
};

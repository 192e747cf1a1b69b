use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Shape mismatch: expected {expected_width}x{expected_height}, found {found_width}x{found_height}")]
    ShapeMismatch {
        expected_width: u32,
        expected_height: u32,
        found_width: u32,
        found_height: u32,
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("Invalid buffer length: expected {expected} samples, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    #[error("Frame capture failed: {0}")]
    CaptureFailure(String),

    #[error("Failed to decode RAW image: {0}")]
    DecodeError(String),

    #[error("Failed to encode output frame: {0}")]
    EncodingFailure(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn shape_mismatch(expected: (u32, u32), found: (u32, u32)) -> Self {
        Self::ShapeMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            found_width: found.0,
            found_height: found.1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

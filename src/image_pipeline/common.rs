//! Common utilities module
//!
//! This module contains shared utilities used across the image pipeline.

pub mod error;
pub mod stop;
pub mod timing;

pub use error::{PipelineError, Result};
pub use stop::StopHandle;
pub use timing::{PipelineTimings, StepTiming, Timer};

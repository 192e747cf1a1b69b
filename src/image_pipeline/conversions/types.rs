//! NDVI pipeline configuration types

use std::time::Duration;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::encode::OutputFormat;
use crate::image_pipeline::processing::{
    AnnotationStyle, Colormap, DEFAULT_DENOMINATOR_EPSILON, DEFAULT_HIGH_PERCENTILE,
    DEFAULT_LOW_PERCENTILE,
};

/// Captions for the four panels, in processing order: NIR band, first
/// index, blue band, second index.
pub const DEFAULT_LABELS: [&str; 4] = ["NIR", "GNDVI", "BLUE", "BNDVI"];

/// What the stream does when the source fails to deliver a frame.
///
/// Encoding failures always end the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureRetry {
    /// Propagate the first capture error and end the stream
    #[default]
    FailStop,
    /// Re-read up to `max_attempts` more times, sleeping `backoff` in between
    Retry { max_attempts: u32, backoff: Duration },
}

/// Configuration for the per-frame NDVI pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Denominator substituted where `a + b == 0`
    pub epsilon: f32,
    /// Contrast stretch lower percentile, mapped toward 0
    pub low_percentile: f32,
    /// Contrast stretch upper percentile, mapped toward 255
    pub high_percentile: f32,
    /// Panel captions: NIR band, first index, blue band, second index
    pub labels: [String; 4],
    pub annotation: AnnotationStyle,
    pub colormap: Colormap,
    pub output: OutputFormat,
    /// Whether to reject empty or oversized frames before processing
    pub validate_dimensions: bool,
    /// Largest accepted frame side when validating
    pub max_dimension: Option<u32>,
    pub capture_retry: CaptureRetry,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_DENOMINATOR_EPSILON,
            low_percentile: DEFAULT_LOW_PERCENTILE,
            high_percentile: DEFAULT_HIGH_PERCENTILE,
            labels: DEFAULT_LABELS.map(String::from),
            annotation: AnnotationStyle::default(),
            colormap: Colormap::default(),
            output: OutputFormat::default(),
            validate_dimensions: true,
            max_dimension: Some(8192),
            capture_retry: CaptureRetry::default(),
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(PipelineError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        let in_range = |p: f32| (0.0..=100.0).contains(&p);
        if !in_range(self.low_percentile)
            || !in_range(self.high_percentile)
            || self.low_percentile >= self.high_percentile
        {
            return Err(PipelineError::InvalidConfig(format!(
                "percentiles must satisfy 0 <= low < high <= 100, got {} and {}",
                self.low_percentile, self.high_percentile
            )));
        }
        if self.annotation.scale == 0 {
            return Err(PipelineError::InvalidConfig("annotation scale must be at least 1".into()));
        }
        if let OutputFormat::Jpeg { quality } = self.output {
            if !(1..=100).contains(&quality) {
                return Err(PipelineError::InvalidConfig(format!(
                    "JPEG quality must be 1..=100, got {}",
                    quality
                )));
            }
        }
        if self.max_dimension == Some(0) {
            return Err(PipelineError::InvalidConfig("max_dimension must be non-zero".into()));
        }
        Ok(())
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    epsilon: Option<f32>,
    percentiles: Option<(f32, f32)>,
    labels: Option<[String; 4]>,
    annotation: Option<AnnotationStyle>,
    colormap: Option<Colormap>,
    output: Option<OutputFormat>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<u32>>,
    capture_retry: Option<CaptureRetry>,
}

impl PipelineConfigBuilder {
    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn percentiles(mut self, low: f32, high: f32) -> Self {
        self.percentiles = Some((low, high));
        self
    }

    pub fn labels(mut self, labels: [&str; 4]) -> Self {
        self.labels = Some(labels.map(String::from));
        self
    }

    pub fn annotation(mut self, style: AnnotationStyle) -> Self {
        self.annotation = Some(style);
        self
    }

    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = Some(colormap);
        self
    }

    pub fn output(mut self, output: OutputFormat) -> Self {
        self.output = Some(output);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<u32>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn capture_retry(mut self, retry: CaptureRetry) -> Self {
        self.capture_retry = Some(retry);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        let (low_percentile, high_percentile) = self
            .percentiles
            .unwrap_or((default.low_percentile, default.high_percentile));
        PipelineConfig {
            epsilon: self.epsilon.unwrap_or(default.epsilon),
            low_percentile,
            high_percentile,
            labels: self.labels.unwrap_or(default.labels),
            annotation: self.annotation.unwrap_or(default.annotation),
            colormap: self.colormap.unwrap_or(default.colormap),
            output: self.output.unwrap_or(default.output),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            capture_retry: self.capture_retry.unwrap_or(default.capture_retry),
        }
    }
}

use tracing::{debug, instrument, warn};

use crate::image_pipeline::{
    common::{PipelineError, PipelineTimings, Result},
    conversions::{stream::FrameStream, types::PipelineConfig},
    encode::{ConfiguredEncoder, EncodedFrame, FrameEncoder},
    frame::{Channel, Frame, FrameSource, Mosaic, extract_band},
    processing::{Annotator, ColorMapper, ContrastStretcher, IndexCalculator, compose_panels},
};

/// Turns one raw frame into one encoded NDVI mosaic.
///
/// Stages run strictly in order: band extraction, two index computations
/// (NIR against green and NIR against blue), captions, 2x2 composition,
/// pseudo-coloring and encoding. Nothing is carried over between frames.
pub struct NdviPipeline<E: FrameEncoder = ConfiguredEncoder> {
    encoder: E,
    config: PipelineConfig,
    index: IndexCalculator,
    annotator: Annotator,
    mapper: ColorMapper,
}

impl NdviPipeline<ConfiguredEncoder> {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let encoder = ConfiguredEncoder::from_format(config.output);
        Self::with_custom(encoder, config)
    }
}

impl<E: FrameEncoder> NdviPipeline<E> {
    pub fn with_custom(encoder: E, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let stretcher = ContrastStretcher::new(config.low_percentile, config.high_percentile);
        Ok(Self {
            encoder,
            index: IndexCalculator::new(config.epsilon, stretcher),
            annotator: Annotator::new(config.annotation),
            mapper: ColorMapper::new(config.colormap),
            config,
        })
    }

    fn validate_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Frame dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(PipelineError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Labeled 2x2 mosaic before pseudo-coloring.
    pub fn mosaic(&self, frame: &Frame) -> Result<Mosaic> {
        self.build_mosaic(frame, &mut PipelineTimings::new())
    }

    fn build_mosaic(&self, frame: &Frame, timings: &mut PipelineTimings) -> Result<Mosaic> {
        timings.time("validate", || self.validate_dimensions(frame.width(), frame.height()))?;

        let (mut nir, green, mut blue) = timings.time("extract", || {
            let _span = tracing::debug_span!("extract_bands").entered();
            (
                extract_band(frame, Channel::Nir),
                extract_band(frame, Channel::Green),
                extract_band(frame, Channel::Blue),
            )
        });

        let (mut index_a, mut index_b) = timings.time("index", || -> Result<_> {
            let _span = tracing::debug_span!("index").entered();
            Ok((
                self.index.compute(&nir, &green)?,
                self.index.compute(&nir, &blue)?,
            ))
        })?;

        timings.time("annotate", || {
            let _span = tracing::debug_span!("annotate").entered();
            let [nir_label, index_a_label, blue_label, index_b_label] = &self.config.labels;
            self.annotator.annotate(&mut nir, nir_label);
            self.annotator.annotate(&mut index_a, index_a_label);
            self.annotator.annotate(&mut blue, blue_label);
            self.annotator.annotate(&mut index_b, index_b_label);
        });

        timings.time("compose", || {
            let _span = tracing::debug_span!("compose").entered();
            compose_panels([&nir, &index_a, &blue, &index_b])
        })
    }

    #[instrument(skip(self, frame), fields(width = frame.width(), height = frame.height()))]
    pub fn process_with_timings(&self, frame: &Frame) -> Result<(EncodedFrame, PipelineTimings)> {
        let mut timings = PipelineTimings::new();

        let mut mosaic = self.build_mosaic(frame, &mut timings)?;

        timings.time("colormap", || {
            let _span = tracing::debug_span!("colormap").entered();
            self.mapper.apply_in_place(&mut mosaic);
        });

        let encoded = timings.time("encode", || {
            let _span = tracing::debug_span!("encode").entered();
            self.encoder.encode(&mosaic)
        })?;

        debug!(
            bytes = encoded.len(),
            "Frame processed in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok((encoded, timings))
    }

    pub fn process(&self, frame: &Frame) -> Result<EncodedFrame> {
        self.process_with_timings(frame).map(|(encoded, _)| encoded)
    }

    /// Drives this pipeline over a capture source.
    pub fn stream<S: FrameSource>(self, source: S) -> FrameStream<S, E> {
        FrameStream::new(source, self)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

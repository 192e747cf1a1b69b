//! Replays RAW stills from disk as a capture feed.
//!
//! Each file is decoded with rawloader, reduced to 8 bits per sample,
//! demosaiced (RGGB, bilinear) with the bayer crate and resized to the
//! configured resolution.

use std::io::Cursor;
use std::path::PathBuf;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use image::imageops::{self, FilterType};
use rawloader::RawImageData as RawloaderImageData;
use tracing::{debug, info};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::common::stop::StopHandle;
use crate::image_pipeline::frame::source::{CaptureConfig, FrameSource};
use crate::image_pipeline::frame::types::{Frame, RGB_CHANNELS, copy_frame};

/// Bit depth assumed when the file carries no usable white level.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

/// Decoded sensor mosaic, before demosaicing.
#[derive(Debug, Clone)]
pub struct RawMosaic {
    pub width: u32,
    pub height: u32,
    /// Single channel Bayer samples
    pub data: Vec<u16>,
    /// Actual bits per sample from the sensor (e.g., 10, 12 or 14)
    pub bits_per_sample: u32,
}

pub struct RawFileSource {
    paths: std::vec::IntoIter<PathBuf>,
    config: CaptureConfig,
}

impl RawFileSource {
    pub fn new(paths: Vec<PathBuf>, config: CaptureConfig) -> Self {
        Self {
            paths: paths.into_iter(),
            config,
        }
    }
}

impl FrameSource for RawFileSource {
    fn start(&mut self, stop: &StopHandle) -> Result<()> {
        info!(
            files = self.paths.len(),
            width = self.config.width,
            height = self.config.height,
            "Replaying RAW captures"
        );
        if !self.config.warmup.is_zero() {
            debug!("Replay warm-up {:?}", self.config.warmup);
            stop.wait_timeout(self.config.warmup);
        }
        Ok(())
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        let Some(path) = self.paths.next() else {
            return Ok(false);
        };
        debug!(path = %path.display(), "Reading RAW capture");

        let bytes = std::fs::read(&path).map_err(|e| {
            PipelineError::CaptureFailure(format!("{}: {}", path.display(), e))
        })?;
        let mosaic = decode_raw(&bytes)?;
        let rgb = demosaic_8bit(&mosaic)
            .map_err(|e| PipelineError::CaptureFailure(format!("{}: {:#}", path.display(), e)))?;

        let (width, height) = (self.config.width, self.config.height);
        if rgb.dimensions() == (width, height) {
            copy_frame(frame, &rgb);
        } else {
            copy_frame(frame, &imageops::resize(&rgb, width, height, FilterType::Nearest));
        }
        Ok(true)
    }

    fn close(&mut self) {
        self.paths = Vec::new().into_iter();
    }
}

/// Decodes a RAW file (ARW, CR2, NEF, DNG, ...) into its Bayer samples.
pub fn decode_raw(data: &[u8]) -> Result<RawMosaic> {
    debug!("Decoding RAW image, {} bytes", data.len());

    let decoded = rawloader::decode(&mut Cursor::new(data))
        .map_err(|e| PipelineError::DecodeError(e.to_string()))?;

    let (Ok(width), Ok(height)) = (u32::try_from(decoded.width), u32::try_from(decoded.height)) else {
        return Err(PipelineError::DecodeError(format!(
            "sensor size {}x{} out of range",
            decoded.width, decoded.height
        )));
    };
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions(width, height));
    }

    let data: Vec<u16> = match decoded.data {
        RawloaderImageData::Integer(values) => values,
        // Float data is normalized to 0.0-1.0
        RawloaderImageData::Float(values) => {
            values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect()
        }
    };

    // The white level is the largest value the sensor can produce, which
    // gives its real bit depth.
    let max_white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
    let bits_per_sample = if max_white_level == 0 {
        DEFAULT_BITS_PER_SAMPLE
    } else {
        U16_BITS - max_white_level.leading_zeros()
    };

    debug!(
        "Decoded {}x{} mosaic, {} bits per sample",
        width, height, bits_per_sample
    );

    Ok(RawMosaic {
        width,
        height,
        data,
        bits_per_sample,
    })
}

/// Scales samples to 8 bits and demosaics them into an RGB frame.
fn demosaic_8bit(mosaic: &RawMosaic) -> anyhow::Result<Frame> {
    let shift = mosaic.bits_per_sample.saturating_sub(8);
    let bayer_bytes: Vec<u8> = mosaic
        .data
        .iter()
        .map(|&v| (v >> shift).min(u8::MAX as u16) as u8)
        .collect();

    let (width, height) = (mosaic.width as usize, mosaic.height as usize);
    let mut output = vec![0u8; width * height * RGB_CHANNELS];
    let mut raster = RasterMut::new(width, height, RasterDepth::Depth8, &mut output);

    bayer::run_demosaic(
        &mut Cursor::new(&bayer_bytes[..]),
        BayerDepth::Depth8,
        CFA::RGGB,
        Demosaic::Linear,
        &mut raster,
    )
    .map_err(|e| anyhow::anyhow!("Demosaic failed: {:?}", e))?;

    Frame::from_raw(mosaic.width, mosaic.height, output)
        .ok_or_else(|| anyhow::anyhow!("Demosaic output does not fit {}x{}", mosaic.width, mosaic.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Write;
    use std::time::{Duration, Instant};

    fn config() -> CaptureConfig {
        CaptureConfig::builder()
            .resolution(4, 4)
            .warmup(Duration::ZERO)
            .build()
    }

    #[test]
    fn missing_file_is_capture_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = RawFileSource::new(vec![dir.path().join("absent.arw")], config());

        let err = source.read_frame(&mut Frame::new(0, 0)).unwrap_err();
        assert!(matches!(err, PipelineError::CaptureFailure(_)));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a raw file").unwrap();
        let mut source = RawFileSource::new(vec![file.path().to_path_buf()], config());

        let err = source.read_frame(&mut Frame::new(0, 0)).unwrap_err();
        assert!(matches!(err, PipelineError::DecodeError(_)));
    }

    #[test]
    fn empty_list_ends_immediately() {
        let mut source = RawFileSource::new(Vec::new(), config());
        assert!(!source.read_frame(&mut Frame::new(0, 0)).unwrap());
    }

    #[test]
    fn warmup_is_honoured_and_interruptible() {
        let config = |warmup| {
            CaptureConfig::builder()
                .resolution(4, 4)
                .warmup(warmup)
                .build()
        };
        let stop = StopHandle::new();

        let start = Instant::now();
        RawFileSource::new(Vec::new(), config(Duration::from_millis(30)))
            .start(&stop)
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));

        stop.stop();
        let start = Instant::now();
        RawFileSource::new(Vec::new(), config(Duration::from_secs(30)))
            .start(&stop)
            .unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn nearest_resize_keeps_corner_pixels() {
        // 2x2 source, each pixel a distinct grey level
        let src = Frame::from_raw(2, 2, vec![10, 10, 10, 20, 20, 20, 30, 30, 30, 40, 40, 40]).unwrap();
        let mut frame = Frame::new(0, 0);
        copy_frame(&mut frame, &imageops::resize(&src, 4, 4, FilterType::Nearest));

        assert_eq!(frame.dimensions(), (4, 4));
        assert_eq!(*frame.get_pixel(0, 0), Rgb([10, 10, 10]));
        assert_eq!(*frame.get_pixel(3, 0), Rgb([20, 20, 20]));
        assert_eq!(*frame.get_pixel(0, 3), Rgb([30, 30, 30]));
        assert_eq!(*frame.get_pixel(3, 3), Rgb([40, 40, 40]));
    }
}

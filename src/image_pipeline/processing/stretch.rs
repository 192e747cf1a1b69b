//! Percentile-based linear contrast stretch.

use image::Luma;
use tracing::trace;

use crate::image_pipeline::frame::types::{Band, IndexImage};

pub const DEFAULT_LOW_PERCENTILE: f32 = 5.0;
pub const DEFAULT_HIGH_PERCENTILE: f32 = 95.0;

const OUT_MIN: f32 = 0.0;
const OUT_MAX: f32 = 255.0;

/// Value written to every pixel when the percentile range is empty.
pub const DEGENERATE_FILL: f32 = 128.0;

/// Maps the low percentile toward 0 and the high percentile toward 255.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastStretcher {
    low_percentile: f32,
    high_percentile: f32,
}

impl Default for ContrastStretcher {
    fn default() -> Self {
        Self {
            low_percentile: DEFAULT_LOW_PERCENTILE,
            high_percentile: DEFAULT_HIGH_PERCENTILE,
        }
    }
}

impl ContrastStretcher {
    /// Percentiles are in `[0, 100]` with `low < high`; the pipeline config
    /// checks this before building a stretcher.
    pub fn new(low_percentile: f32, high_percentile: f32) -> Self {
        Self {
            low_percentile,
            high_percentile,
        }
    }

    /// `(in_min, in_max)` for the given samples.
    pub fn input_range(&self, values: &[f32]) -> (f32, f32) {
        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(f32::total_cmp);
        (
            percentile_of_sorted(&sorted, self.low_percentile),
            percentile_of_sorted(&sorted, self.high_percentile),
        )
    }

    /// Applies `out = (in - in_min) * ((0 - 255) / (in_min - in_max)) + in_min`.
    ///
    /// The result is not clamped. A flat image (`in_min == in_max`) comes back
    /// filled with [`DEGENERATE_FILL`].
    pub fn stretch(&self, image: &IndexImage) -> IndexImage {
        let (width, height) = image.dimensions();
        if image.is_empty() {
            return IndexImage::new(width, height);
        }

        let (in_min, in_max) = self.input_range(image.as_raw());
        if in_max - in_min <= 0.0 {
            trace!(in_min, in_max, "Degenerate stretch range, filling mid-grey");
            return IndexImage::from_pixel(width, height, Luma([DEGENERATE_FILL]));
        }

        let scale = (OUT_MIN - OUT_MAX) / (in_min - in_max);
        let mut out = image.clone();
        for v in out.iter_mut() {
            *v = (*v - in_min) * scale + in_min;
        }
        out
    }

    /// Stretches and converts to 8 bits, clamping to `[0, 255]` first so
    /// values past the percentiles saturate instead of wrapping.
    pub fn stretch_to_band(&self, image: &IndexImage) -> Band {
        let stretched = self.stretch(image);
        Band::from_fn(stretched.width(), stretched.height(), |x, y| {
            Luma([stretched.get_pixel(x, y)[0].clamp(OUT_MIN, OUT_MAX) as u8])
        })
    }
}

/// Linear-interpolated percentile of `values`, `p` in `[0, 100]`.
///
/// Returns `NaN` for an empty slice.
pub fn percentile(values: &[f32], p: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);
    percentile_of_sorted(&sorted, p)
}

fn percentile_of_sorted(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return f32::NAN;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

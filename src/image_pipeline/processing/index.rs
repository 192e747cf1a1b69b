//! Normalized difference index between two bands.

use image::Luma;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::frame::types::{Band, IndexImage, ensure_same_shape};
use crate::image_pipeline::processing::stretch::ContrastStretcher;

/// Substituted for a zero denominator `a + b`.
pub const DEFAULT_DENOMINATOR_EPSILON: f32 = 0.01;

/// `(a - b) / (a + b)` per pixel, with `a + b == 0` replaced by `epsilon`.
///
/// Both bands must have the same shape; nothing is broadcast or cropped.
pub fn normalized_difference(a: &Band, b: &Band, epsilon: f32) -> Result<IndexImage> {
    ensure_same_shape(a, b)?;

    Ok(IndexImage::from_fn(a.width(), a.height(), |x, y| {
        let a = a.get_pixel(x, y)[0] as f32;
        let b = b.get_pixel(x, y)[0] as f32;
        let mut bottom = a + b;
        if bottom == 0.0 {
            bottom = epsilon;
        }
        Luma([(a - b) / bottom])
    }))
}

/// Produces display-ready index bands: raw ratio, contrast stretch, 8-bit cast.
#[derive(Debug, Clone, Copy)]
pub struct IndexCalculator {
    epsilon: f32,
    stretcher: ContrastStretcher,
}

impl Default for IndexCalculator {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_DENOMINATOR_EPSILON,
            stretcher: ContrastStretcher::default(),
        }
    }
}

impl IndexCalculator {
    pub fn new(epsilon: f32, stretcher: ContrastStretcher) -> Self {
        Self { epsilon, stretcher }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Unstretched ratios.
    pub fn ratio(&self, a: &Band, b: &Band) -> Result<IndexImage> {
        normalized_difference(a, b, self.epsilon)
    }

    pub fn compute(&self, a: &Band, b: &Band) -> Result<Band> {
        let ratio = self.ratio(a, b)?;
        Ok(self.stretcher.stretch_to_band(&ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::common::error::PipelineError;

    fn band(width: u32, height: u32, data: &[u8]) -> Band {
        Band::from_raw(width, height, data.to_vec()).unwrap()
    }

    #[test]
    fn all_zero_bands_are_finite() {
        let zeros = Band::new(3, 3);
        let index = normalized_difference(&zeros, &zeros, DEFAULT_DENOMINATOR_EPSILON).unwrap();
        assert!(index.as_raw().iter().all(|v| v.is_finite()));
        assert!(index.as_raw().iter().all(|&v| v == 0.0));

        let display = IndexCalculator::default().compute(&zeros, &zeros).unwrap();
        assert_eq!(display.dimensions(), (3, 3));
    }

    #[test]
    fn matches_formula_where_denominator_nonzero() {
        let a = band(4, 1, &[200, 10, 0, 255]);
        let b = band(4, 1, &[100, 30, 50, 255]);
        let index = normalized_difference(&a, &b, DEFAULT_DENOMINATOR_EPSILON).unwrap();

        let expected = [100.0 / 300.0, -20.0 / 40.0, -1.0, 0.0];
        for (got, want) in index.as_raw().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn zero_denominator_uses_epsilon() {
        // 0 / epsilon stays 0 whatever epsilon is; mixed pixels are untouched
        let a = band(2, 1, &[0, 5]);
        let b = band(2, 1, &[0, 0]);
        let index = normalized_difference(&a, &b, 0.5).unwrap();
        assert_eq!(index.as_raw(), &vec![0.0, 1.0]);
    }

    #[test]
    fn shape_mismatch_fails_fast() {
        let a = Band::new(4, 2);
        let b = Band::new(2, 4);
        let err = normalized_difference(&a, &b, DEFAULT_DENOMINATOR_EPSILON).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShapeMismatch {
                expected_width: 4,
                expected_height: 2,
                found_width: 2,
                found_height: 4,
            }
        ));
    }

    #[test]
    fn compute_stretches_to_full_range() {
        let a = band(5, 1, &[0, 50, 100, 150, 200]);
        let b = Band::from_pixel(5, 1, Luma([100]));
        let display = IndexCalculator::default().compute(&a, &b).unwrap();

        assert_eq!(display.get_pixel(0, 0)[0], 0);
        assert_eq!(display.get_pixel(4, 0)[0], 255);
    }
}

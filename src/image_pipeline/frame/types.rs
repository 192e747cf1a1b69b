//! In-memory image types shared by every pipeline stage, and the few
//! helpers the `image` crate does not provide.

use std::mem;

use image::{GenericImageView, ImageBuffer, Luma, Rgb};

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Color channel of a captured frame.
///
/// The sensor has its IR filter removed, so the red channel carries mostly
/// near-infrared light. The names follow that convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Channel 0, near-infrared surrogate
    Nir,
    /// Channel 1
    Green,
    /// Channel 2
    Blue,
}

impl Channel {
    pub const fn index(self) -> usize {
        match self {
            Self::Nir => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// One 8-bit channel sliced out of a [`Frame`]. Always an owned copy.
pub type Band = image::GrayImage;

/// Normalized difference ratios, nominally in [-1, 1].
pub type IndexImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// One raw capture handed over by a [`FrameSource`](crate::image_pipeline::FrameSource).
pub type Frame = image::RgbImage;

/// The 2x2 panel composition, `(2W, 2H)`.
pub type Mosaic = image::RgbImage;

pub const RGB_CHANNELS: usize = 3;

fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * RGB_CHANNELS
}

/// Fails with [`PipelineError::ShapeMismatch`] unless both images have the same size.
pub fn ensure_same_shape<A, B>(expected: &A, found: &B) -> Result<()>
where
    A: GenericImageView,
    B: GenericImageView,
{
    if expected.dimensions() != found.dimensions() {
        return Err(PipelineError::shape_mismatch(
            expected.dimensions(),
            found.dimensions(),
        ));
    }
    Ok(())
}

/// Copies one channel into a new [`Band`].
///
/// The copy is what makes in-place annotation of the band safe: the frame
/// and every other band stay untouched.
pub fn extract_band(frame: &Frame, channel: Channel) -> Band {
    let c = channel.index();
    Band::from_fn(frame.width(), frame.height(), |x, y| {
        Luma([frame.get_pixel(x, y)[c]])
    })
}

/// Wraps interleaved RGB samples, which must be exactly `width * height * 3` long.
pub fn frame_from_vec(width: u32, height: u32, samples: Vec<u8>) -> Result<Frame> {
    let expected = rgb_len(width, height);
    if samples.len() != expected {
        return Err(PipelineError::BufferLength {
            expected,
            actual: samples.len(),
        });
    }
    Frame::from_raw(width, height, samples).ok_or(PipelineError::InvalidDimensions(width, height))
}

/// Builds a frame from three equally sized planes.
pub fn frame_from_bands(r: &Band, g: &Band, b: &Band) -> Result<Frame> {
    ensure_same_shape(r, g)?;
    ensure_same_shape(r, b)?;
    Ok(Frame::from_fn(r.width(), r.height(), |x, y| {
        Rgb([r.get_pixel(x, y)[0], g.get_pixel(x, y)[0], b.get_pixel(x, y)[0]])
    }))
}

/// Resizes `frame` for a `width` x `height` capture, zeroed, and hands back
/// the samples to fill. Existing capacity is reused.
pub fn reset_frame(frame: &mut Frame, width: u32, height: u32) -> &mut [u8] {
    let mut samples = mem::replace(frame, Frame::new(0, 0)).into_raw();
    samples.clear();
    samples.resize(rgb_len(width, height), 0);
    *frame = Frame::from_raw(width, height, samples).unwrap_or_else(|| Frame::new(width, height));
    &mut **frame
}

/// Overwrites `frame` with the contents of `source`, keeping capacity.
pub fn copy_frame(frame: &mut Frame, source: &Frame) {
    reset_frame(frame, source.width(), source.height()).copy_from_slice(source.as_raw());
}

/// Drops the samples but keeps the allocation for the next capture.
pub fn clear_frame(frame: &mut Frame) {
    reset_frame(frame, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_2x1() -> Frame {
        frame_from_vec(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn extract_band_picks_channel() {
        let frame = frame_2x1();
        assert_eq!(extract_band(&frame, Channel::Nir).as_raw(), &vec![1, 4]);
        assert_eq!(extract_band(&frame, Channel::Green).as_raw(), &vec![2, 5]);
        assert_eq!(extract_band(&frame, Channel::Blue).as_raw(), &vec![3, 6]);
    }

    #[test]
    fn mutating_band_leaves_frame_intact() {
        let frame = frame_2x1();
        let mut nir = extract_band(&frame, Channel::Nir);
        nir.fill(255);

        assert_eq!(frame.as_raw(), &vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(extract_band(&frame, Channel::Nir).as_raw(), &vec![1, 4]);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = frame_from_vec(2, 2, vec![0; 5]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::BufferLength { expected: 12, actual: 5 }
        ));

        // longer buffers are rejected too, not silently truncated
        let err = frame_from_vec(1, 1, vec![0; 4]).unwrap_err();
        assert!(matches!(err, PipelineError::BufferLength { .. }));
    }

    #[test]
    fn from_bands_interleaves() {
        let r = Band::from_pixel(1, 2, Luma([10]));
        let g = Band::from_pixel(1, 2, Luma([20]));
        let b = Band::from_pixel(1, 2, Luma([30]));
        let frame = frame_from_bands(&r, &g, &b).unwrap();
        assert_eq!(frame.as_raw(), &vec![10, 20, 30, 10, 20, 30]);

        let wrong = Band::new(2, 1);
        assert!(matches!(
            frame_from_bands(&r, &g, &wrong),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn clear_keeps_allocation() {
        let mut frame = Frame::new(8, 8);
        let capacity = frame.as_raw().capacity();
        clear_frame(&mut frame);
        assert_eq!(frame.dimensions(), (0, 0));
        assert!(frame.is_empty());
        assert_eq!(frame.as_raw().capacity(), capacity);

        let samples = reset_frame(&mut frame, 4, 4);
        assert_eq!(samples.len(), 48);
        assert_eq!(frame.dimensions(), (4, 4));
        assert_eq!(frame.as_raw().capacity(), capacity);
    }

    #[test]
    fn copy_frame_replaces_contents() {
        let source = frame_2x1();
        let mut frame = Frame::new(5, 5);
        copy_frame(&mut frame, &source);
        assert_eq!(frame, source);
    }
}

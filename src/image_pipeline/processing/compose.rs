//! 2x2 panel mosaic.

use image::GenericImage;
use image::buffer::ConvertBuffer;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::frame::types::{Band, Mosaic, ensure_same_shape};

/// Quadrant order of the `panels` argument to [`compose_panels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Quadrant {
    pub const ORDER: [Quadrant; 4] = [
        Self::TopLeft,
        Self::BottomLeft,
        Self::TopRight,
        Self::BottomRight,
    ];

    /// Pixel offset `(x, y)` of this quadrant for panels of `width` x `height`.
    pub fn offset(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::TopLeft => (0, 0),
            Self::BottomLeft => (0, height),
            Self::TopRight => (width, 0),
            Self::BottomRight => (width, height),
        }
    }
}

/// Places four equally sized grey panels into a `(2W, 2H)` RGB mosaic, in
/// [`Quadrant::ORDER`]: top-left, bottom-left, top-right, bottom-right.
///
/// Each panel is expanded to three channels by replicating its intensity.
pub fn compose_panels(panels: [&Band; 4]) -> Result<Mosaic> {
    let (width, height) = panels[0].dimensions();
    for panel in &panels[1..] {
        ensure_same_shape(panels[0], *panel)?;
    }
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions(width, height));
    }
    let (Some(mosaic_width), Some(mosaic_height)) = (width.checked_mul(2), height.checked_mul(2))
    else {
        return Err(PipelineError::InvalidDimensions(width, height));
    };

    let mut mosaic = Mosaic::new(mosaic_width, mosaic_height);
    for (panel, quadrant) in panels.into_iter().zip(Quadrant::ORDER) {
        let (x, y) = quadrant.offset(width, height);
        let rgb: Mosaic = panel.convert();
        mosaic
            .copy_from(&rgb, x, y)
            .map_err(|_| PipelineError::InvalidDimensions(width, height))?;
    }

    Ok(mosaic)
}

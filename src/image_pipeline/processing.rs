//! Per-frame image processing stages
//!
//! Index computation, contrast stretch, captions, panel composition and
//! pseudo-coloring. Every stage works on owned buffers.

mod annotate;
mod colormap;
mod compose;
mod font;
mod index;
mod stretch;

pub use annotate::{AnnotationStyle, Annotator};
pub use colormap::{ColorMapper, Colormap};
pub use compose::{Quadrant, compose_panels};
pub use index::{DEFAULT_DENOMINATOR_EPSILON, IndexCalculator, normalized_difference};
pub use stretch::{
    ContrastStretcher, DEFAULT_HIGH_PERCENTILE, DEFAULT_LOW_PERCENTILE, DEGENERATE_FILL, percentile,
};

//! Fixed-position text captions drawn into single-channel images.

use image::Luma;

use crate::image_pipeline::frame::types::Band;
use crate::image_pipeline::processing::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Where and how captions are drawn. Fixed for the lifetime of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationStyle {
    /// Left edge of the first glyph
    pub x: u32,
    /// Top edge of the glyphs
    pub y: u32,
    /// Image pixels per font pixel
    pub scale: u32,
    /// Extra pixels added to each font pixel, right and down
    pub thickness: u32,
    /// Sample value written for inked pixels
    pub intensity: u8,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            x: 4,
            y: 4,
            scale: 4,
            thickness: 1,
            intensity: u8::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Annotator {
    style: AnnotationStyle,
}

impl Annotator {
    pub fn new(style: AnnotationStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Draws `text` on one line at the style's anchor, overwriting pixels in
    /// place. Glyphs falling outside the image are clipped.
    pub fn annotate<'a>(&self, image: &'a mut Band, text: &str) -> &'a mut Band {
        let AnnotationStyle {
            x,
            y,
            scale,
            thickness,
            intensity,
        } = self.style;
        let (width, height) = image.dimensions();
        if y >= height {
            return image;
        }

        // Coordinates saturate, so anything past u32::MAX is simply off-image.
        let cell = scale.saturating_add(thickness.saturating_sub(1));
        let advance = (ADVANCE as u32).saturating_mul(scale);
        let mut origin_x = x;

        for ch in text.chars() {
            if origin_x >= width {
                break;
            }
            let glyph = font::glyph(ch);

            for row in 0..GLYPH_HEIGHT {
                let top = y.saturating_add((row as u32).saturating_mul(scale));
                if top >= height {
                    break;
                }
                let bottom = top.saturating_add(cell).min(height);

                for col in 0..GLYPH_WIDTH {
                    if !font::is_set(glyph, col, row) {
                        continue;
                    }
                    let left = origin_x.saturating_add((col as u32).saturating_mul(scale));
                    let right = left.saturating_add(cell).min(width);
                    for py in top..bottom {
                        for px in left..right {
                            image.put_pixel(px, py, Luma([intensity]));
                        }
                    }
                }
            }
            origin_x = origin_x.saturating_add(advance);
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotator(scale: u32, thickness: u32) -> Annotator {
        Annotator::new(AnnotationStyle {
            x: 2,
            y: 1,
            scale,
            thickness,
            intensity: 200,
        })
    }

    fn at(band: &Band, x: u32, y: u32) -> u8 {
        band.get_pixel(x, y)[0]
    }

    #[test]
    fn draws_inside_text_box_only() {
        let mut band = Band::new(40, 20);
        annotator(1, 1).annotate(&mut band, "I");

        // top bar of I spans columns 1..=3 of the glyph
        assert_eq!(at(&band, 2 + 1, 1), 200);
        assert_eq!(at(&band, 2 + 3, 1), 200);
        assert_eq!(at(&band, 2, 1), 0);
        // stem
        assert_eq!(at(&band, 2 + 2, 1 + 3), 200);

        let (gw, gh) = (GLYPH_WIDTH as u32, GLYPH_HEIGHT as u32);
        for (x, y, px) in band.enumerate_pixels() {
            let inside = (2..2 + gw).contains(&x) && (1..1 + gh).contains(&y);
            if !inside {
                assert_eq!(px[0], 0, "stray ink at ({x}, {y})");
            }
        }
    }

    #[test]
    fn scale_and_thickness_grow_strokes() {
        let mut band = Band::new(40, 40);
        annotator(2, 2).annotate(&mut band, "I");

        // font pixel (1, 0) covers x 4..7, y 1..4 at scale 2 plus one extra
        for y in 1..4 {
            for x in 4..7 {
                assert_eq!(at(&band, x, y), 200);
            }
        }
    }

    #[test]
    fn returns_same_image() {
        let mut band = Band::new(10, 10);
        let ptr = &band as *const Band;
        let returned = annotator(1, 1).annotate(&mut band, "A");
        assert!(std::ptr::eq(returned, ptr));
    }

    #[test]
    fn empty_text_is_noop() {
        let mut band = Band::from_pixel(8, 8, Luma([3]));
        annotator(1, 1).annotate(&mut band, "");
        assert!(band.as_raw().iter().all(|&v| v == 3));
    }

    #[test]
    fn clips_at_image_edge() {
        let mut band = Band::new(6, 10);
        Annotator::default().annotate(&mut band, "BNDVI");
        assert_eq!(band.dimensions(), (6, 10));
        assert!(band.as_raw().iter().any(|&v| v == u8::MAX));
    }

    #[test]
    fn extreme_anchor_and_scale_do_not_overflow() {
        let styles = [
            AnnotationStyle {
                x: u32::MAX - 1,
                y: u32::MAX - 1,
                ..AnnotationStyle::default()
            },
            AnnotationStyle {
                x: 0,
                y: 0,
                scale: u32::MAX,
                thickness: u32::MAX,
                intensity: 9,
            },
        ];
        for style in styles {
            let mut band = Band::new(16, 16);
            Annotator::new(style).annotate(&mut band, "NDVI NDVI NDVI");
            assert_eq!(band.dimensions(), (16, 16));
        }

        // an anchor far to the right leaves the band untouched
        let mut band = Band::new(16, 16);
        let style = AnnotationStyle {
            x: u32::MAX - 3,
            y: 0,
            ..AnnotationStyle::default()
        };
        Annotator::new(style).annotate(&mut band, "AB");
        assert!(band.as_raw().iter().all(|&v| v == 0));

        // a huge scale inks the whole band from the first font pixel onward
        let mut band = Band::new(16, 16);
        let style = AnnotationStyle {
            x: 0,
            y: 0,
            scale: u32::MAX,
            thickness: 1,
            intensity: 9,
        };
        // font pixel (0, 0) of 'B' is set
        Annotator::new(style).annotate(&mut band, "B");
        assert!(band.as_raw().iter().all(|&v| v == 9));
    }
}

//! Pseudo-color palettes applied to the mosaic.

use image::Rgb;

use crate::image_pipeline::frame::types::Mosaic;

/// RGB color stop at position `t` in [0, 1].
#[derive(Debug, Clone, Copy)]
struct ColorStop {
    t: f64,
    color: [u8; 3],
}

impl ColorStop {
    const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self { t, color: [r, g, b] }
    }
}

const JET_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 0, 0, 128),
    ColorStop::new(0.125, 0, 0, 255),
    ColorStop::new(0.375, 0, 255, 255),
    ColorStop::new(0.625, 255, 255, 0),
    ColorStop::new(0.875, 255, 0, 0),
    ColorStop::new(1.000, 128, 0, 0),
];

// Brown -> Yellow -> Green
const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 120, 70, 20),
    ColorStop::new(0.3, 200, 170, 60),
    ColorStop::new(0.5, 240, 230, 100),
    ColorStop::new(0.7, 100, 180, 50),
    ColorStop::new(1.0, 10, 100, 20),
];

const GRAYSCALE_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0, 0, 0),
    ColorStop::new(1.0, 255, 255, 255),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Dark blue -> cyan -> yellow -> dark red
    #[default]
    Jet,
    /// Brown -> yellow -> green
    Ndvi,
    Grayscale,
}

impl Colormap {
    fn stops(self) -> &'static [ColorStop] {
        match self {
            Self::Jet => JET_STOPS,
            Self::Ndvi => NDVI_STOPS,
            Self::Grayscale => GRAYSCALE_STOPS,
        }
    }

    /// 256-entry lookup table indexed by intensity.
    pub fn lut(self) -> [[u8; 3]; 256] {
        let stops = self.stops();
        let mut lut = [[0u8; 3]; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = multi_stop(stops, i as f64 / 255.0);
        }
        lut
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn multi_stop(stops: &[ColorStop], t: f64) -> [u8; 3] {
    if t <= stops[0].t {
        return stops[0].color;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.t {
            let ratio = (t - lo.t) / (hi.t - lo.t);
            return [0, 1, 2].map(|c| lerp(lo.color[c] as f64, hi.color[c] as f64, ratio).round() as u8);
        }
    }
    stops[stops.len() - 1].color
}

/// Luma of an RGB pixel (ITU-R BT.601 weights). Exact for grey pixels.
fn luma(&Rgb([r, g, b]): &Rgb<u8>) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}

/// Recolors each pixel by looking up its intensity in a palette.
#[derive(Clone)]
pub struct ColorMapper {
    colormap: Colormap,
    lut: [[u8; 3]; 256],
}

impl ColorMapper {
    pub fn new(colormap: Colormap) -> Self {
        Self {
            colormap,
            lut: colormap.lut(),
        }
    }

    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    pub fn apply_in_place(&self, mosaic: &mut Mosaic) {
        for px in mosaic.pixels_mut() {
            *px = Rgb(self.lut[luma(px) as usize]);
        }
    }

    pub fn apply(&self, mosaic: &Mosaic) -> Mosaic {
        let mut out = mosaic.clone();
        self.apply_in_place(&mut out);
        out
    }
}

impl std::fmt::Debug for ColorMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorMapper")
            .field("colormap", &self.colormap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_endpoints_and_middle() {
        let lut = Colormap::Jet.lut();
        assert_eq!(lut[0], [0, 0, 128]);
        assert_eq!(lut[255], [128, 0, 0]);
        // around 0.5 jet is green-dominant
        let mid = lut[128];
        assert!(mid[1] > 200, "{mid:?}");
    }

    #[test]
    fn grayscale_is_identity() {
        let lut = Colormap::Grayscale.lut();
        for (i, entry) in lut.iter().enumerate() {
            assert_eq!(*entry, [i as u8; 3]);
        }
    }

    #[test]
    fn luma_of_grey_is_exact() {
        for v in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(luma(&Rgb([v, v, v])), v);
        }
    }

    #[test]
    fn apply_maps_grey_through_palette() {
        let mosaic = Mosaic::from_raw(2, 1, vec![0, 0, 0, 255, 255, 255]).unwrap();
        let mapper = ColorMapper::new(Colormap::Jet);
        let colored = mapper.apply(&mosaic);

        assert_eq!(colored.dimensions(), (2, 1));
        assert_eq!(*colored.get_pixel(0, 0), Rgb([0, 0, 128]));
        assert_eq!(*colored.get_pixel(1, 0), Rgb([128, 0, 0]));
        // input untouched
        assert_eq!(*mosaic.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}

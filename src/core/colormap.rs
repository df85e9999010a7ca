//! Piecewise-linear scalar to RGBA color mapping.

use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur when building a color map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorMapError {
    #[error("palette needs at least 2 colors, got {0}")]
    TooFewColors(usize),

    #[error("color map range is inverted: lo {lo} > hi {hi}")]
    InvertedRange { lo: f32, hi: f32 },

    #[error("color map range must not be NaN: [{lo}, {hi}]")]
    NanRange { lo: f32, hi: f32 },
}

/// "Cool to warm" diverging palette: blue, light gray, red.
const COOL_TO_WARM: [[f32; 3]; 3] = [
    [0.231373, 0.298039, 0.752941],
    [0.865003, 0.865003, 0.865003],
    [0.705882, 0.0156863, 0.14902],
];

/// Ordered RGB control points, evenly spaced over the mapped range.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<[f32; 3]>,
}

impl Palette {
    /// Creates a palette from at least two RGB control points.
    pub fn new(colors: Vec<[f32; 3]>) -> Result<Self, ColorMapError> {
        if colors.len() < 2 {
            return Err(ColorMapError::TooFewColors(colors.len()));
        }
        Ok(Self { colors })
    }

    /// The built-in cool-to-warm palette.
    pub fn cool_to_warm() -> Self {
        Self {
            colors: COOL_TO_WARM.to_vec(),
        }
    }

    #[inline]
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    #[inline]
    pub fn first(&self) -> [f32; 3] {
        self.colors[0]
    }

    #[inline]
    pub fn last(&self) -> [f32; 3] {
        self.colors[self.colors.len() - 1]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::cool_to_warm()
    }
}

/// Maps scalars in `[lo, hi]` onto a palette.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    lo: f32,
    hi: f32,
    palette: Palette,
}

impl ColorMap {
    /// Creates a color map over `[lo, hi]`. `lo == hi` is allowed, and
    /// either bound may be infinite.
    pub fn new(lo: f32, hi: f32, palette: Palette) -> Result<Self, ColorMapError> {
        if lo.is_nan() || hi.is_nan() {
            return Err(ColorMapError::NanRange { lo, hi });
        }
        if lo > hi {
            return Err(ColorMapError::InvertedRange { lo, hi });
        }
        Ok(Self { lo, hi, palette })
    }

    /// Color map over `[lo, hi]` using the cool-to-warm palette.
    pub fn cool_to_warm(lo: f32, hi: f32) -> Result<Self, ColorMapError> {
        Self::new(lo, hi, Palette::cool_to_warm())
    }

    pub fn range(&self) -> (f32, f32) {
        (self.lo, self.hi)
    }

    /// Color for `value`, fully opaque.
    ///
    /// Values at or below `lo` take the first color, values at or above
    /// `hi` the last. A collapsed range (`lo == hi`) and NaN map to the
    /// first color. So does any value whose position in an infinite range
    /// is undefined.
    pub fn color_for(&self, value: f32) -> [f32; 4] {
        if self.lo == self.hi || !(value > self.lo) {
            return opaque(self.palette.first());
        }
        if value >= self.hi {
            return opaque(self.palette.last());
        }

        let colors = self.palette.colors();
        let segments = colors.len() - 1;
        let position = (value - self.lo) * segments as f32 / (self.hi - self.lo);
        if position.is_nan() {
            return opaque(self.palette.first());
        }
        let position = position.min(segments as f32);
        let index = (position.floor() as usize).min(segments - 1);
        let t = position - index as f32;

        let (a, b) = (colors[index], colors[index + 1]);
        opaque([
            a[0] + t * (b[0] - a[0]),
            a[1] + t * (b[1] - a[1]),
            a[2] + t * (b[2] - a[2]),
        ])
    }

    /// Maps every value, preserving order.
    pub fn colors_for(&self, values: &[f32]) -> Vec<[f32; 4]> {
        values.par_iter().map(|&v| self.color_for(v)).collect()
    }
}

#[inline]
fn opaque(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}

/// Converts a unit-range RGBA color to 8-bit channels.
pub fn to_rgba8(color: [f32; 4]) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: [f32; 4], expected: [f32; 4]) {
        for i in 0..4 {
            assert!(
                (actual[i] - expected[i]).abs() < 1e-6,
                "channel {}: {:?} vs {:?}",
                i,
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_palette_needs_two_colors() {
        assert_eq!(Palette::new(vec![[0.0; 3]]), Err(ColorMapError::TooFewColors(1)));
        assert!(Palette::new(vec![[0.0; 3], [1.0; 3]]).is_ok());
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            ColorMap::cool_to_warm(2.0, 1.0),
            Err(ColorMapError::InvertedRange { .. })
        ));
        assert!(matches!(
            ColorMap::cool_to_warm(f32::NAN, 1.0),
            Err(ColorMapError::NanRange { .. })
        ));
    }

    #[test]
    fn test_infinite_upper_bound() {
        let map = ColorMap::cool_to_warm(0.0, f32::INFINITY).unwrap();
        assert_eq!(map.range(), (0.0, f32::INFINITY));

        assert_eq!(map.color_for(0.0), opaque(COOL_TO_WARM[0]));
        assert_eq!(map.color_for(1.0), opaque(COOL_TO_WARM[0]));
        assert_eq!(map.color_for(1.0e30), opaque(COOL_TO_WARM[0]));
        assert_eq!(map.color_for(f32::INFINITY), opaque(COOL_TO_WARM[2]));
    }

    #[test]
    fn test_infinite_lower_bound() {
        let map = ColorMap::cool_to_warm(f32::NEG_INFINITY, 2.0).unwrap();

        assert_eq!(map.color_for(f32::NEG_INFINITY), opaque(COOL_TO_WARM[0]));
        assert_eq!(map.color_for(1.0), opaque(COOL_TO_WARM[0]));
        assert_eq!(map.color_for(2.0), opaque(COOL_TO_WARM[2]));
        for channel in map.color_for(-5.0) {
            assert!(channel.is_finite());
        }
    }

    #[test]
    fn test_clamps_outside_range() {
        let map = ColorMap::cool_to_warm(-1.0, 3.0).unwrap();
        let first = opaque(COOL_TO_WARM[0]);
        let last = opaque(COOL_TO_WARM[2]);

        assert_eq!(map.color_for(-1.0), first);
        assert_eq!(map.color_for(-1.5), first);
        assert_eq!(map.color_for(f32::NEG_INFINITY), first);
        assert_eq!(map.color_for(3.0), last);
        assert_eq!(map.color_for(3.5), last);
        assert_eq!(map.color_for(f32::INFINITY), last);
    }

    #[test]
    fn test_collapsed_range_uses_first_color() {
        let map = ColorMap::cool_to_warm(4.0, 4.0).unwrap();
        let first = opaque(COOL_TO_WARM[0]);

        assert_eq!(map.color_for(4.0), first);
        assert_eq!(map.color_for(3.0), first);
        assert_eq!(map.color_for(5.0), first);
    }

    #[test]
    fn test_nan_uses_first_color() {
        let map = ColorMap::cool_to_warm(0.0, 1.0).unwrap();
        assert_eq!(map.color_for(f32::NAN), opaque(COOL_TO_WARM[0]));
    }

    #[test]
    fn test_exact_middle_color() {
        let map = ColorMap::cool_to_warm(0.0, 2.0).unwrap();
        assert_eq!(map.color_for(1.0), opaque(COOL_TO_WARM[1]));
    }

    #[test]
    fn test_interpolates_between_neighbours() {
        let map = ColorMap::cool_to_warm(0.0, 2.0).unwrap();
        let [a, b] = [COOL_TO_WARM[0], COOL_TO_WARM[1]];
        let mid = [
            (a[0] + b[0]) / 2.0,
            (a[1] + b[1]) / 2.0,
            (a[2] + b[2]) / 2.0,
            1.0,
        ];
        assert_close(map.color_for(0.5), mid);

        let [b, c] = [COOL_TO_WARM[1], COOL_TO_WARM[2]];
        let upper_mid = [
            b[0] + 0.5 * (c[0] - b[0]),
            b[1] + 0.5 * (c[1] - b[1]),
            b[2] + 0.5 * (c[2] - b[2]),
            1.0,
        ];
        assert_close(map.color_for(1.5), upper_mid);
    }

    #[test]
    fn test_alpha_is_opaque() {
        let map = ColorMap::cool_to_warm(0.0, 10.0).unwrap();
        for i in 0..=20 {
            assert_eq!(map.color_for(i as f32 * 0.5)[3], 1.0);
        }
    }

    #[test]
    fn test_colors_for_preserves_order() {
        let map = ColorMap::cool_to_warm(1.0, 2.0).unwrap();
        let values: Vec<f32> = (0..1000).map(|i| 1.0 + (i % 7) as f32 / 6.0).collect();
        let colors = map.colors_for(&values);

        assert_eq!(colors.len(), values.len());
        for (value, color) in values.iter().zip(&colors) {
            assert_eq!(*color, map.color_for(*value));
        }
    }

    #[test]
    fn test_two_color_palette() {
        let palette = Palette::new(vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]).unwrap();
        let map = ColorMap::new(0.0, 4.0, palette).unwrap();
        assert_close(map.color_for(1.0), [0.25, 0.25, 0.25, 1.0]);
    }

    #[test]
    fn test_to_rgba8() {
        assert_eq!(to_rgba8([0.0, 1.0, 0.5, 1.0]), [0, 255, 128, 255]);
        assert_eq!(to_rgba8([-1.0, 2.0, 0.0, 1.0]), [0, 255, 0, 255]);
    }
}

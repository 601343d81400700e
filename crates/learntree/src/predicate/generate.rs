//! Predicate family generators and pool presets.
//!
//! Each generator enumerates every placement of one family over a square
//! image, in row-major placement order. Presets concatenate generators in a
//! fixed order so that pool ids are reproducible from the preset alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Axis, ImageShape, PoolError, Predicate, PredicatePool, Region};

/// Ink threshold used by the standard pool.
pub const STANDARD_THRESHOLD: i32 = 25;

/// Ink threshold used by the basic pool.
pub const BASIC_THRESHOLD: i32 = 128;

// =============================================================================
// Generators
// =============================================================================

/// One `pixel > threshold` test per pixel.
pub fn pixel_thresholds(shape: ImageShape, threshold: i32) -> Vec<Predicate> {
    (0..shape.n_pixels() as u32)
        .map(|pixel| Predicate::PixelThreshold { pixel, threshold })
        .collect()
}

/// Square `size x size` blocks at every position.
pub fn pixel_blocks(shape: ImageShape, size: u16, min_dark: u32, threshold: i32) -> Vec<Predicate> {
    placements(shape, size, size)
        .map(|region| Predicate::PixelBlock {
            region,
            min_dark,
            threshold,
        })
        .collect()
}

/// `rows x cols` rectangles, plus the transposed shape when it differs, at
/// every position.
pub fn rectangles(
    shape: ImageShape,
    rows: u16,
    cols: u16,
    min_dark: u32,
    threshold: i32,
) -> Vec<Predicate> {
    let mut out: Vec<Predicate> = placements(shape, rows, cols)
        .map(|region| Predicate::Rectangle {
            region,
            min_dark,
            threshold,
        })
        .collect();
    if rows != cols {
        out.extend(placements(shape, cols, rows).map(|region| Predicate::Rectangle {
            region,
            min_dark,
            threshold,
        }));
    }
    out
}

/// Every row, then every column, needing `min_dark` pixels above `threshold`.
pub fn line_columns(shape: ImageShape, min_dark: u32, threshold: i32) -> Vec<Predicate> {
    let width = shape.width as u16;
    [Axis::Row, Axis::Column]
        .into_iter()
        .flat_map(|axis| {
            (0..width).map(move |line| Predicate::LineColumn {
                axis,
                line,
                width,
                min_dark,
                threshold,
            })
        })
        .collect()
}

/// Whole-image ink counts, one predicate per multiple of the image width up
/// to half the pixel count.
pub fn dark_pixels(shape: ImageShape, threshold: i32) -> Vec<Predicate> {
    let step = shape.width.max(1) as usize;
    let limit = shape.n_pixels() / 2;
    (step..=limit)
        .step_by(step)
        .map(|min_dark| Predicate::DarkPixels {
            min_dark: min_dark as u32,
            threshold,
        })
        .collect()
}

fn placements(shape: ImageShape, height: u16, width: u16) -> impl Iterator<Item = Region> {
    let side = shape.width as u16;
    let rows = (side + 1).saturating_sub(height);
    let cols = (side + 1).saturating_sub(width);
    let usable = height > 0 && width > 0 && height <= side && width <= side;
    let (rows, cols) = if usable { (rows, cols) } else { (0, 0) };
    (0..rows).flat_map(move |top| {
        (0..cols).map(move |left| Region {
            top,
            left,
            height,
            width,
            stride: side,
        })
    })
}

// =============================================================================
// Presets
// =============================================================================

/// Named predicate pool recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolPreset {
    /// One threshold per pixel at 128.
    Basic,
    /// Pixel thresholds, 2x6 rectangles and row/column counts at 25.
    #[default]
    Standard,
    /// Standard plus 3x3 blocks and whole-image ink counts.
    Extended,
}

impl PoolPreset {
    /// All presets, in increasing size.
    pub const ALL: [PoolPreset; 3] = [Self::Basic, Self::Standard, Self::Extended];

    /// Preset name as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Extended => "extended",
        }
    }

    /// Generate the predicates of this preset for one image shape.
    pub fn predicates(self, shape: ImageShape) -> Vec<Predicate> {
        let th = STANDARD_THRESHOLD;
        match self {
            Self::Basic => pixel_thresholds(shape, BASIC_THRESHOLD),
            Self::Standard => {
                let mut out = pixel_thresholds(shape, th);
                out.extend(rectangles(shape, 2, 6, 4, th));
                for k in 1..=10 {
                    out.extend(line_columns(shape, k, th));
                }
                out
            }
            Self::Extended => {
                let mut out = Self::Standard.predicates(shape);
                out.extend(pixel_blocks(shape, 3, 4, th));
                out.extend(dark_pixels(shape, th));
                out
            }
        }
    }

    /// Generate and validate the pool of this preset.
    pub fn build(self, shape: ImageShape) -> Result<PredicatePool, PoolError> {
        let pool = PredicatePool::new(self.predicates(shape))?;
        pool.validate_for(shape.n_pixels())?;
        Ok(pool)
    }

    /// Build the pool for data with `n_features` pixels per example.
    pub fn build_for(self, n_features: usize) -> Result<PredicatePool, PoolError> {
        let shape = ImageShape::from_n_features(n_features).ok_or(PoolError::NotSquare { n_features })?;
        self.build(shape)
    }
}

impl fmt::Display for PoolPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PoolPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown pool preset '{s}' (expected basic, standard or extended)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::PredicateKind;
    use rstest::rstest;

    #[test]
    fn pixel_thresholds_cover_every_pixel() {
        let preds = pixel_thresholds(ImageShape::square(4), 7);
        assert_eq!(preds.len(), 16);
        assert_eq!(
            preds[15],
            Predicate::PixelThreshold {
                pixel: 15,
                threshold: 7
            }
        );
    }

    #[test]
    fn rectangles_include_transpose() {
        // 8x8: 2x6 fits 7*3 times, 6x2 fits 3*7 times.
        let preds = rectangles(ImageShape::square(8), 2, 6, 4, 25);
        assert_eq!(preds.len(), 42);
        let square = rectangles(ImageShape::square(8), 3, 3, 4, 25);
        assert_eq!(square.len(), 36);
    }

    #[test]
    fn oversized_shapes_generate_nothing() {
        assert!(rectangles(ImageShape::square(4), 2, 6, 4, 25).is_empty());
        assert!(pixel_blocks(ImageShape::square(2), 3, 4, 25).is_empty());
    }

    #[test]
    fn line_columns_rows_then_columns() {
        let preds = line_columns(ImageShape::square(5), 2, 25);
        assert_eq!(preds.len(), 10);
        assert!(matches!(preds[0], Predicate::LineColumn { axis: Axis::Row, line: 0, .. }));
        assert!(matches!(preds[5], Predicate::LineColumn { axis: Axis::Column, line: 0, .. }));
    }

    #[test]
    fn dark_pixels_steps_by_width() {
        let preds = dark_pixels(ImageShape::square(4), 25);
        assert_eq!(preds.len(), 2);
        assert!(matches!(preds[1], Predicate::DarkPixels { min_dark: 8, .. }));
    }

    #[rstest]
    #[case(PoolPreset::Basic, 784)]
    #[case(PoolPreset::Standard, 784 + 2 * 27 * 23 + 10 * 56)]
    #[case(PoolPreset::Extended, 784 + 2 * 27 * 23 + 10 * 56 + 26 * 26 + 14)]
    fn preset_sizes_for_mnist(#[case] preset: PoolPreset, #[case] expected: usize) {
        let pool = preset.build(ImageShape::square(28)).unwrap();
        assert_eq!(pool.len(), expected);
    }

    #[test]
    fn presets_validate_against_their_shape() {
        for preset in PoolPreset::ALL {
            let pool = preset.build_for(64).unwrap();
            assert!(pool.validate_for(64).is_ok());
        }
        assert_eq!(
            PoolPreset::Basic.build_for(10),
            Err(PoolError::NotSquare { n_features: 10 })
        );
    }

    #[test]
    fn standard_preset_family_order() {
        let pool = PoolPreset::Standard.build(ImageShape::square(8)).unwrap();
        let kinds: Vec<_> = pool.kind_counts().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                PredicateKind::PixelThreshold,
                PredicateKind::Rectangle,
                PredicateKind::LineColumn
            ]
        );
    }

    #[test]
    fn preset_parses_case_insensitively() {
        assert_eq!("Standard".parse::<PoolPreset>(), Ok(PoolPreset::Standard));
        assert!("huge".parse::<PoolPreset>().is_err());
    }
}

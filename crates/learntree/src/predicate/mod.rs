//! Candidate split predicates.
//!
//! A predicate is a boolean test over one example's feature vector. Trees
//! branch on predicates: examples answering "yes" go to the left child, the
//! rest to the right child.
//!
//! Predicates are a closed set of variants, each carrying its own parameters:
//!
//! - [`Predicate::PixelThreshold`]: a single pixel is brighter than a threshold
//! - [`Predicate::PixelBlock`]: enough bright pixels inside a square block
//! - [`Predicate::Rectangle`]: enough bright pixels inside a rectangle
//! - [`Predicate::LineColumn`]: enough bright pixels along a row or column
//! - [`Predicate::DarkPixels`]: enough bright pixels in the whole image
//!
//! ("Dark" follows the MNIST convention: ink is stored as high intensity.)
//!
//! A [`PredicatePool`] fixes the order of predicates; a predicate's position
//! in the pool is its [`PredicateId`].

mod generate;
mod pool;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use generate::{
    PoolPreset, dark_pixels, line_columns, pixel_blocks, pixel_thresholds, rectangles,
};
pub use pool::{PoolError, PredicatePool};

// =============================================================================
// Identity
// =============================================================================

/// Position of a predicate in its pool (and column in the answer cache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PredicateId(pub u32);

impl PredicateId {
    /// The id as an index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PredicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Shape of a square image stored row-major in a feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    /// Pixels per row (and number of rows).
    pub width: u32,
}

impl ImageShape {
    /// Square image of the given side.
    pub fn square(width: u32) -> Self {
        Self { width }
    }

    /// Infer the square shape of a feature vector.
    ///
    /// Returns `None` if `n_features` is not a perfect square.
    pub fn from_n_features(n_features: usize) -> Option<Self> {
        let width = (n_features as f64).sqrt().round() as usize;
        (width * width == n_features && width > 0).then(|| Self::square(width as u32))
    }

    /// Total number of pixels.
    #[inline]
    pub fn n_pixels(self) -> usize {
        (self.width as usize) * (self.width as usize)
    }
}

/// An axis-aligned rectangle inside a square image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Top row.
    pub top: u16,
    /// Left column.
    pub left: u16,
    /// Rows covered.
    pub height: u16,
    /// Columns covered.
    pub width: u16,
    /// Row stride (the image width).
    pub stride: u16,
}

impl Region {
    /// Count pixels inside the region brighter than `threshold`.
    #[inline]
    fn count_above(&self, features: &[i32], threshold: i32) -> u32 {
        let stride = self.stride as usize;
        let mut count = 0;
        let top = self.top as usize;
        for r in top..top + self.height as usize {
            let start = r * stride + self.left as usize;
            let row = &features[start..start + self.width as usize];
            count += row.iter().filter(|&&v| v > threshold).count() as u32;
        }
        count
    }

    /// Largest feature index touched, plus one.
    fn footprint(&self) -> usize {
        if self.height == 0 || self.width == 0 {
            return 0;
        }
        let bottom = self.top as usize + self.height as usize;
        let right = self.left as usize + self.width as usize;
        (bottom - 1) * self.stride as usize + right
    }

    fn fits_stride(&self) -> bool {
        self.left as usize + self.width as usize <= self.stride as usize
    }
}

/// Row or column selector for [`Predicate::LineColumn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Row,
    Column,
}

// =============================================================================
// Predicate
// =============================================================================

/// Family of a predicate, used for usage reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PredicateKind {
    PixelThreshold,
    PixelBlock,
    Rectangle,
    LineColumn,
    DarkPixels,
}

impl PredicateKind {
    /// Human-readable family name.
    pub fn name(self) -> &'static str {
        match self {
            Self::PixelThreshold => "PixelThreshold",
            Self::PixelBlock => "PixelBlock",
            Self::Rectangle => "Rectangle",
            Self::LineColumn => "LineColumn",
            Self::DarkPixels => "DarkPixels",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A boolean test over one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// `features[pixel] > threshold`.
    PixelThreshold { pixel: u32, threshold: i32 },
    /// At least `min_dark` pixels of a square block exceed `threshold`.
    PixelBlock {
        region: Region,
        min_dark: u32,
        threshold: i32,
    },
    /// At least `min_dark` pixels of a rectangle exceed `threshold`.
    Rectangle {
        region: Region,
        min_dark: u32,
        threshold: i32,
    },
    /// At least `min_dark` pixels of one row or column exceed `threshold`.
    LineColumn {
        axis: Axis,
        line: u16,
        width: u16,
        min_dark: u32,
        threshold: i32,
    },
    /// At least `min_dark` pixels of the whole vector exceed `threshold`.
    DarkPixels { min_dark: u32, threshold: i32 },
}

impl Predicate {
    /// Evaluate the predicate on one feature vector.
    ///
    /// The vector must cover the predicate's footprint; pools are checked
    /// with [`PredicatePool::validate_for`] before any evaluation.
    pub fn evaluate(&self, features: &[i32]) -> bool {
        match *self {
            Self::PixelThreshold { pixel, threshold } => features[pixel as usize] > threshold,
            Self::PixelBlock {
                region,
                min_dark,
                threshold,
            }
            | Self::Rectangle {
                region,
                min_dark,
                threshold,
            } => region.count_above(features, threshold) >= min_dark,
            Self::LineColumn {
                axis,
                line,
                width,
                min_dark,
                threshold,
            } => {
                let (line, width) = (line as usize, width as usize);
                let count = match axis {
                    Axis::Row => features[line * width..(line + 1) * width]
                        .iter()
                        .filter(|&&v| v > threshold)
                        .count(),
                    Axis::Column => (0..width)
                        .filter(|&r| features[r * width + line] > threshold)
                        .count(),
                };
                count as u32 >= min_dark
            }
            Self::DarkPixels {
                min_dark,
                threshold,
            } => features.iter().filter(|&&v| v > threshold).count() as u32 >= min_dark,
        }
    }

    /// The family this predicate belongs to.
    pub fn kind(&self) -> PredicateKind {
        match self {
            Self::PixelThreshold { .. } => PredicateKind::PixelThreshold,
            Self::PixelBlock { .. } => PredicateKind::PixelBlock,
            Self::Rectangle { .. } => PredicateKind::Rectangle,
            Self::LineColumn { .. } => PredicateKind::LineColumn,
            Self::DarkPixels { .. } => PredicateKind::DarkPixels,
        }
    }

    /// Check that the predicate only reads indices below `n_features`.
    pub(crate) fn fits(&self, n_features: usize) -> bool {
        match *self {
            Self::PixelThreshold { pixel, .. } => (pixel as usize) < n_features,
            Self::PixelBlock { region, .. } | Self::Rectangle { region, .. } => {
                region.fits_stride() && region.footprint() <= n_features
            }
            Self::LineColumn { line, width, .. } => {
                line < width && (width as usize) * (width as usize) <= n_features
            }
            Self::DarkPixels { .. } => true,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PixelThreshold { pixel, threshold } => {
                write!(f, "pixel[{pixel}] > {threshold}")
            }
            Self::PixelBlock {
                region,
                min_dark,
                threshold,
            } => write!(
                f,
                "block {}x{} @ ({},{}): >= {min_dark} px > {threshold}",
                region.height, region.width, region.top, region.left
            ),
            Self::Rectangle {
                region,
                min_dark,
                threshold,
            } => write!(
                f,
                "rect {}x{} @ ({},{}): >= {min_dark} px > {threshold}",
                region.height, region.width, region.top, region.left
            ),
            Self::LineColumn {
                axis,
                line,
                min_dark,
                threshold,
                ..
            } => {
                let axis = match axis {
                    Axis::Row => "row",
                    Axis::Column => "col",
                };
                write!(f, "{axis} {line}: >= {min_dark} px > {threshold}")
            }
            Self::DarkPixels {
                min_dark,
                threshold,
            } => write!(f, "image: >= {min_dark} px > {threshold}"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // 3x3 image:
    //   0 200   0
    //  50 200  50
    //   0 200 255
    const IMAGE: [i32; 9] = [0, 200, 0, 50, 200, 50, 0, 200, 255];

    fn region(top: u16, left: u16, height: u16, width: u16) -> Region {
        Region {
            top,
            left,
            height,
            width,
            stride: 3,
        }
    }

    #[test]
    fn image_shape_from_features() {
        assert_eq!(ImageShape::from_n_features(784), Some(ImageShape::square(28)));
        assert_eq!(ImageShape::from_n_features(10), None);
        assert_eq!(ImageShape::from_n_features(0), None);
    }

    #[test]
    fn pixel_threshold_is_strict() {
        let p = Predicate::PixelThreshold {
            pixel: 3,
            threshold: 50,
        };
        assert!(!p.evaluate(&IMAGE));
        let p = Predicate::PixelThreshold {
            pixel: 3,
            threshold: 49,
        };
        assert!(p.evaluate(&IMAGE));
    }

    #[test]
    fn rectangle_counts_region_only() {
        // Middle column: three pixels at 200.
        let p = Predicate::Rectangle {
            region: region(0, 1, 3, 1),
            min_dark: 3,
            threshold: 100,
        };
        assert!(p.evaluate(&IMAGE));

        // Left column has nothing above 100.
        let p = Predicate::Rectangle {
            region: region(0, 0, 3, 1),
            min_dark: 1,
            threshold: 100,
        };
        assert!(!p.evaluate(&IMAGE));

        // Bottom-right 2x2: 200, 50, 200, 255 -> three above 100.
        let p = Predicate::PixelBlock {
            region: region(1, 1, 2, 2),
            min_dark: 3,
            threshold: 100,
        };
        assert!(p.evaluate(&IMAGE));
    }

    #[test]
    fn line_column_axes() {
        let row = Predicate::LineColumn {
            axis: Axis::Row,
            line: 2,
            width: 3,
            min_dark: 2,
            threshold: 100,
        };
        assert!(row.evaluate(&IMAGE));

        let col = Predicate::LineColumn {
            axis: Axis::Column,
            line: 2,
            width: 3,
            min_dark: 2,
            threshold: 10,
        };
        assert!(col.evaluate(&IMAGE));

        let col = Predicate::LineColumn {
            axis: Axis::Column,
            line: 0,
            width: 3,
            min_dark: 2,
            threshold: 10,
        };
        assert!(!col.evaluate(&IMAGE));
    }

    #[test]
    fn dark_pixels_counts_everything() {
        let p = Predicate::DarkPixels {
            min_dark: 4,
            threshold: 100,
        };
        assert!(p.evaluate(&IMAGE));
        let p = Predicate::DarkPixels {
            min_dark: 5,
            threshold: 100,
        };
        assert!(!p.evaluate(&IMAGE));
    }

    #[test]
    fn footprint_checks() {
        let p = Predicate::Rectangle {
            region: region(2, 2, 1, 1),
            min_dark: 1,
            threshold: 0,
        };
        assert!(p.fits(9));
        assert!(!p.fits(8));

        let wide = Predicate::Rectangle {
            region: region(0, 2, 1, 2),
            min_dark: 1,
            threshold: 0,
        };
        assert!(!wide.fits(100));

        let p = Predicate::PixelThreshold {
            pixel: 9,
            threshold: 0,
        };
        assert!(!p.fits(9));
    }

    #[test]
    fn display_is_readable() {
        let p = Predicate::PixelThreshold {
            pixel: 407,
            threshold: 25,
        };
        assert_eq!(p.to_string(), "pixel[407] > 25");
        assert_eq!(p.kind().to_string(), "PixelThreshold");
    }
}

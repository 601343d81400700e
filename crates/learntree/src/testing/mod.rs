//! Deterministic synthetic data for tests, doctests and benchmarks.
//!
//! ```
//! use learntree::testing::synthetic_digits;
//!
//! let examples = synthetic_digits(50, 3);
//! assert_eq!(examples.n_features(), 64);
//! ```

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::NUM_CLASSES;
use crate::data::Examples;

/// Side of the images produced by [`synthetic_digits`].
pub const SYNTHETIC_WIDTH: usize = 8;

/// Background pixels never exceed this value.
pub const NOISE_MAX: i32 = 20;

/// `n` labeled 8x8 images, reproducible from `seed`.
///
/// Pixels are background noise in `0..=NOISE_MAX`. An image of class `c` has
/// its 2x2 block at row `(c / 4) * 2`, column `(c % 4) * 2` lit with values in
/// `180..=255`, so every class is separable by a single bright pixel.
pub fn synthetic_digits(n: usize, seed: u64) -> Examples {
    synthetic_images(n, SYNTHETIC_WIDTH, seed)
}

/// Like [`synthetic_digits`] with square images of side `width` (at least 8).
pub fn synthetic_images(n: usize, width: usize, seed: u64) -> Examples {
    assert!(width >= SYNTHETIC_WIDTH, "images need room for ten 2x2 marks");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let n_pixels = width * width;

    let mut labels = Vec::with_capacity(n);
    let mut features = Array2::<i32>::zeros((n, n_pixels));
    for mut row in features.outer_iter_mut() {
        let label = rng.random_range(0..NUM_CLASSES as u8);
        labels.push(label);

        for px in row.iter_mut() {
            *px = rng.random_range(0..=NOISE_MAX);
        }
        let top = (label as usize / 4) * 2;
        let left = (label as usize % 4) * 2;
        for r in top..top + 2 {
            for c in left..left + 2 {
                row[r * width + c] = rng.random_range(180..=255);
            }
        }
    }

    Examples::new(labels, features).expect("synthetic labels are in range")
}

//! Seeded train/test partitioning.

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

/// Row indices of the two partitions produced by [`train_test_split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_fraction)` rows.
///
/// Both partitions are kept non-empty.
pub fn train_test_split(n: usize, test_fraction: f32, seed: u64) -> Result<Split, String> {
    if n < 2 {
        return Err(format!("Need at least 2 rows to split, found {n}"));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(format!(
            "Test fraction must be between 0 and 1 (exclusive), found {test_fraction}"
        ));
    }
    // Tolerance absorbs the f32 representation error of fractions like 0.2.
    let n_test = ((n as f64 * test_fraction as f64 - 1e-6).ceil() as usize).clamp(1, n - 1);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}

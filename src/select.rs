//! Residue-balancing bucket selection.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seed of every selector, so that a given input and split count always
/// produce the same assignment.
pub const SELECTOR_SEED: u64 = 314159;

/// Chooses the bucket that receives the next record.
///
/// Buckets holding fewer residues than the current average are the
/// candidates, and one of them is drawn uniformly at random. When nothing
/// has been written yet, or no bucket is below average, any bucket may be
/// drawn. A single bucket is always chosen without drawing.
///
/// The generator is seeded with [`SELECTOR_SEED`] when the selector is
/// built and its draws are consumed across the whole run.
///
/// # Examples
///
/// ```rust
/// use fasplit::BucketSelector;
///
/// let mut selector = BucketSelector::new();
/// // bucket 1 is the only one below the average of 50
/// assert_eq!(selector.select(&[100, 0]), 1);
/// assert_eq!(selector.select(&[7]), 0);
/// ```
#[derive(Debug, Clone)]
pub struct BucketSelector {
    rng: StdRng,
    candidates: Vec<usize>,
}
impl Default for BucketSelector {
    fn default() -> Self {
        Self::new()
    }
}
impl BucketSelector {
    pub fn new() -> Self {
        Self::with_seed(SELECTOR_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            candidates: Vec::new(),
        }
    }

    /// Returns the index of the bucket that should receive the next record,
    /// given the residue totals of all buckets.
    pub fn select(&mut self, totals: &[u64]) -> usize {
        let split_count = totals.len();
        if split_count <= 1 {
            return 0;
        }

        let sum: u64 = totals.iter().sum();
        if sum == 0 {
            return self.rng.random_range(0..split_count);
        }
        let average = sum as f64 / split_count as f64;

        self.candidates.clear();
        self.candidates.extend(
            totals
                .iter()
                .enumerate()
                .filter(|(_, total)| (**total as f64) < average)
                .map(|(idx, _)| idx),
        );

        if self.candidates.is_empty() {
            self.rng.random_range(0..split_count)
        } else {
            let pick = self.rng.random_range(0..self.candidates.len());
            self.candidates[pick]
        }
    }
}

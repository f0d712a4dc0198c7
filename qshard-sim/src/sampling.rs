//! Walker alias table for O(1) sampling from a discrete distribution

use crate::error::{Result, SimError};
use rand::Rng;

/// Alias table built from (possibly unnormalized) weights
///
/// Setup is O(n); each draw costs two uniform numbers.
///
/// Reference: Walker, A. J. (1977). "An Efficient Method for Generating
/// Discrete Random Variables with General Distributions"
#[derive(Debug, Clone)]
pub(crate) struct AliasTable {
    /// Probability of keeping column `i` rather than taking its alias
    prob: Vec<f64>,
    alias: Vec<usize>,
}

impl AliasTable {
    pub(crate) fn new(weights: &[f64]) -> Result<Self> {
        let n = weights.len();
        if n == 0 {
            return Err(SimError::Validation(
                "cannot sample from an empty distribution".to_string(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if total.is_nan() || total <= 0.0 {
            return Err(SimError::Validation(
                "cannot sample from a distribution with zero total weight".to_string(),
            ));
        }

        let mut scaled: Vec<f64> = weights.iter().map(|&w| w * n as f64 / total).collect();
        let mut prob = vec![0.0; n];
        let mut alias: Vec<usize> = (0..n).collect();

        let (mut small, mut large): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| scaled[i] < 1.0);

        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            large.pop();

            prob[s] = scaled[s];
            alias[s] = l;
            scaled[l] = (scaled[l] + scaled[s]) - 1.0;

            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // Leftovers are 1 up to rounding.
        for i in large.into_iter().chain(small) {
            prob[i] = 1.0;
        }

        Ok(Self { prob, alias })
    }

    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.prob.len();
        let i = rng.gen_range(0..n);
        if rng.gen::<f64>() < self.prob[i] {
            i
        } else {
            self.alias[i]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(AliasTable::new(&[]).is_err());
        assert!(AliasTable::new(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_point_mass() {
        let table = AliasTable::new(&[0.0, 0.0, 1.0, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!((0..200).all(|_| table.sample(&mut rng) == 2));
    }

    #[test]
    fn test_frequencies_match_weights() {
        let weights = [0.1, 0.2, 0.3, 0.4];
        let table = AliasTable::new(&weights).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let shots = 100_000;
        let mut counts = [0usize; 4];
        for _ in 0..shots {
            counts[table.sample(&mut rng)] += 1;
        }
        for (count, w) in counts.iter().zip(weights) {
            assert_relative_eq!(*count as f64 / shots as f64, w, epsilon = 0.01);
        }
    }

    #[test]
    fn test_unnormalized_weights() {
        let table = AliasTable::new(&[3.0, 1.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let zeros = (0..40_000).filter(|_| table.sample(&mut rng) == 0).count();
        assert_relative_eq!(zeros as f64 / 40_000.0, 0.75, epsilon = 0.01);
    }
}

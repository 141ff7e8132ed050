use rand::Rng;

const MULTIPLIER_A: i64 = 1103515245;
const INCREMENT_C: i64 = 12345;
const MODULUS: i64 = i32::MAX as i64;
const DEFAULT_SEED: i64 = 3819201;

/// Source of randomness for rollouts and move sampling.
pub trait RandomGenerator: Default {
    fn next(&mut self) -> u32;
    /// Returns a value in `from..to`.
    fn next_range(&mut self, from: usize, to: usize) -> usize;
    /// Returns a value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    fn choose<'a, K>(&mut self, items: &'a [K]) -> Option<&'a K> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_range(0, items.len()))
    }

    /// Picks an index with probability proportional to its weight.
    ///
    /// Returns `None` when there is no positive, finite total weight.
    fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }

        let target = self.next_unit() * total;
        let mut cumulative = 0.0;
        for (idx, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            if target < cumulative {
                return Some(idx);
            }
        }

        weights.iter().rposition(|w| *w > 0.0)
    }
}

/// Generator backed by the thread-local RNG of `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRandomGenerator;

impl RandomGenerator for StandardRandomGenerator {
    fn next(&mut self) -> u32 {
        rand::random()
    }

    fn next_range(&mut self, from: usize, to: usize) -> usize {
        rand::rng().random_range(from..to)
    }

    fn next_unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Seeded linear congruential generator. Searches using it are reproducible.
#[derive(Debug, Clone)]
pub struct CustomNumberGenerator {
    seed: i64,
}

impl Default for CustomNumberGenerator {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl RandomGenerator for CustomNumberGenerator {
    fn next(&mut self) -> u32 {
        self.seed = (self.seed * MULTIPLIER_A + INCREMENT_C) % MODULUS;
        self.seed as u32
    }

    fn next_range(&mut self, from: usize, to: usize) -> usize {
        from + self.next() as usize % (to - from)
    }

    fn next_unit(&mut self) -> f64 {
        self.next() as f64 / MODULUS as f64
    }
}

impl CustomNumberGenerator {
    pub const fn new(seed: u32) -> Self {
        Self {
            seed: seed as i64 % MODULUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::random::{CustomNumberGenerator, RandomGenerator, StandardRandomGenerator};

    #[test]
    fn seeded_generator_is_reproducible() {
        let mut crg = CustomNumberGenerator::new(42);
        let cells: Vec<usize> = (0..4).map(|_| crg.next_range(0, 64)).collect();
        assert_eq!(cells, vec![48, 10, 29, 28]);

        let mut other = CustomNumberGenerator::new(42);
        assert_eq!(other.next_range(0, 64), 48);
    }

    #[test]
    fn unit_values_stay_in_range() {
        let mut crg = CustomNumberGenerator::new(7);
        assert!((crg.next_unit() - 0.597_056_057_116_508_6).abs() < 1e-12);
        for _ in 0..1000 {
            let u = crg.next_unit();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn weighted_choice_follows_the_sequence() {
        let mut crg = CustomNumberGenerator::new(42);
        let picks: Vec<Option<usize>> = (0..5).map(|_| crg.choose_weighted(&[1.0, 3.0])).collect();
        assert_eq!(picks, vec![Some(1), Some(1), Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let mut crg = CustomNumberGenerator::default();
        for _ in 0..100 {
            assert_eq!(crg.choose_weighted(&[0.0, 2.0, 0.0]), Some(1));
        }
        assert_eq!(crg.choose_weighted(&[0.0, 0.0]), None);
        assert_eq!(crg.choose_weighted(&[]), None);
    }

    #[test]
    fn choose_from_slices() {
        let empty: [u8; 0] = [];
        let mut rg = StandardRandomGenerator;
        assert!(rg.choose(&empty).is_none());
        let items = [3, 5, 7];
        for _ in 0..50 {
            assert!(items.contains(rg.choose(&items).unwrap()));
        }
    }
}

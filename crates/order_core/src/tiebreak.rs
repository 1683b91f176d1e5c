//! Seedable tie-breaking.
//!
//! Without a seed the scheduler is fully sequential: candidate pools keep
//! configured order and the first best candidate wins. With a seed, pools
//! are shuffled through `ChaCha8Rng`, which is stable across platforms, so
//! the same seed always yields the same schedule.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub enum TieBreaker {
    Sequential,
    Seeded(ChaCha8Rng),
}

impl TieBreaker {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => TieBreaker::Seeded(ChaCha8Rng::seed_from_u64(seed)),
            None => TieBreaker::Sequential,
        }
    }

    /// Reorder a candidate pool. No-op when sequential.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        if let TieBreaker::Seeded(rng) = self {
            items.shuffle(rng);
        }
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self, TieBreaker::Seeded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_keeps_order() {
        let mut tie = TieBreaker::from_seed(None);
        let mut items = vec![1, 2, 3, 4, 5];
        tie.shuffle(&mut items);
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert!(!tie.is_seeded());
    }

    #[test]
    fn test_same_seed_same_shuffle() {
        let mut first = TieBreaker::from_seed(Some(7));
        let mut second = TieBreaker::from_seed(Some(7));
        let mut a: Vec<u32> = (0..20).collect();
        let mut b: Vec<u32> = (0..20).collect();
        first.shuffle(&mut a);
        second.shuffle(&mut b);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
    }
}

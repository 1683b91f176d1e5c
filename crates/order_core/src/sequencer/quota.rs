//! Pair-type quota ledger.
//!
//! With `N` runs over `T` pair types every type is owed `base = N / T`
//! appearances and `remainder = N % T` types get one extra. A placement is
//! admissible when, after it, the ledger can still finish with every type
//! at `base` or `base + 1` and exactly `remainder` types at `base + 1`.

#[derive(Debug, Clone)]
pub struct PairQuota {
    base: u32,
    remainder: u32,
    counts: Vec<u32>,
    last_used: Vec<u32>,
}

impl PairQuota {
    pub fn new(run_count: u32, kinds: usize) -> Self {
        let kinds_u32 = kinds.max(1) as u32;
        Self {
            base: run_count / kinds_u32,
            remainder: run_count % kinds_u32,
            counts: vec![0; kinds],
            last_used: vec![0; kinds],
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn remainder(&self) -> u32 {
        self.remainder
    }

    pub fn count(&self, kind: usize) -> u32 {
        self.counts[kind]
    }

    /// Run index the kind was last placed at; 0 when never.
    pub fn last_used(&self, kind: usize) -> u32 {
        self.last_used[kind]
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Whether placing `kind` now keeps the distribution reachable, given
    /// `remaining` runs still to place after this one.
    pub fn admits(&self, kind: usize, remaining: u32) -> bool {
        let base = self.base;
        let current = self.counts[kind];
        let next = current + 1;
        if next > base + 1 {
            return false;
        }

        let mut extra_used: u32 = self.counts.iter().map(|&c| c.saturating_sub(base)).sum();
        if current >= base {
            extra_used += 1;
        }
        if extra_used > self.remainder {
            return false;
        }

        let required_min: u32 = self
            .counts
            .iter()
            .enumerate()
            .map(|(k, &c)| {
                let c = if k == kind { next } else { c };
                base.saturating_sub(c)
            })
            .sum();
        if required_min > remaining {
            return false;
        }

        let extra_needed = self.remainder - extra_used;
        remaining - required_min >= extra_needed
    }

    /// Place `kind` at `run`. Returns the previous last-used index so a
    /// backtracking caller can restore it.
    pub fn take(&mut self, kind: usize, run: u32) -> u32 {
        self.counts[kind] += 1;
        std::mem::replace(&mut self.last_used[kind], run)
    }

    pub fn untake(&mut self, kind: usize, previous_last_used: u32) {
        self.counts[kind] -= 1;
        self.last_used[kind] = previous_last_used;
    }

    /// Spread between the most- and least-used kinds.
    pub fn deviation(&self) -> u32 {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        let min = self.counts.iter().copied().min().unwrap_or(0);
        max - min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_and_remainder() {
        let quota = PairQuota::new(14, 12);
        assert_eq!(quota.base(), 1);
        assert_eq!(quota.remainder(), 2);
    }

    #[test]
    fn test_no_kind_above_base_plus_one() {
        let mut quota = PairQuota::new(4, 2);
        quota.take(0, 1);
        quota.take(0, 2);
        // base = 2, remainder = 0: a third placement is never admissible.
        assert!(!quota.admits(0, 10));
        assert!(quota.admits(1, 1));
    }

    #[test]
    fn test_extras_limited_by_remainder() {
        // 5 runs over 4 kinds: exactly one kind gets a second slot.
        let mut quota = PairQuota::new(5, 4);
        quota.take(0, 1);
        assert!(quota.admits(0, 3));
        quota.take(0, 2);
        quota.take(1, 3);
        assert!(!quota.admits(1, 2));
        assert!(quota.admits(2, 1));
    }

    #[test]
    fn test_minimums_must_stay_reachable() {
        // 3 runs over 3 kinds: no kind may appear twice.
        let mut quota = PairQuota::new(3, 3);
        quota.take(0, 1);
        assert!(!quota.admits(0, 1));
        assert!(quota.admits(1, 1));
    }

    #[test]
    fn test_untake_restores_state() {
        let mut quota = PairQuota::new(6, 3);
        let previous = quota.take(2, 4);
        assert_eq!(previous, 0);
        assert_eq!(quota.last_used(2), 4);
        quota.untake(2, previous);
        assert_eq!(quota.count(2), 0);
        assert_eq!(quota.last_used(2), 0);
        assert_eq!(quota.deviation(), 0);
    }
}

use crate::base::ceil_sqrt;
use crate::partition::Partition;

/// Distance between the two members of a pair, and the narrowest chunk that
/// can hold one full pair window
pub const PAIR_SPAN: u64 = 6;

/// Worker sizing decided once by the coordinator and broadcast to every rank
///
/// Invariant: `active * chunk + remainder == range_len()`; the last active
/// rank absorbs the remainder so partitions tile (ceil_sqrt(N), N] exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    pub bound: u64,
    pub active: usize,
    pub chunk: u64,
    pub remainder: u64,
}

impl Plan {
    /// Decide how many of the `launched` ranks are useful for `bound`
    ///
    /// - Each chunk must be at least `PAIR_SPAN` wide, otherwise a pair
    ///   could skip over a whole partition and never be stitched
    /// - When that does not hold the worker count shrinks to R / 6
    /// - When R < 6 no worker is useful and `active` is 0
    pub fn new(bound: u64, launched: usize) -> Self {
        let range = bound - ceil_sqrt(bound);
        let launched = launched.max(1) as u64;

        let (active, chunk) = if range / launched < PAIR_SPAN {
            (range / PAIR_SPAN, PAIR_SPAN)
        } else {
            (launched, range / launched)
        };

        Self {
            bound,
            active: active as usize,
            chunk,
            remainder: range - active * chunk,
        }
    }

    /// First value above the base table
    pub fn range_start(&self) -> u64 {
        ceil_sqrt(self.bound) + 1
    }

    pub fn range_len(&self) -> u64 {
        self.bound - ceil_sqrt(self.bound)
    }

    /// Participation predicate, evaluated identically on every rank
    pub fn is_active(&self, rank: usize) -> bool {
        rank < self.active
    }

    pub fn is_last(&self, rank: usize) -> bool {
        self.active > 0 && rank == self.active - 1
    }

    pub fn excluded(&self, launched: usize) -> usize {
        launched.saturating_sub(self.active)
    }

    /// Partition owned by `rank`, or None for an excluded rank
    pub fn partition(&self, rank: usize) -> Option<Partition> {
        if !self.is_active(rank) {
            return None;
        }

        let start = self.range_start() + rank as u64 * self.chunk;
        let mut end = start + self.chunk - 1;
        if self.is_last(rank) {
            end += self.remainder;
        }

        Some(Partition::new(start, end))
    }

    /// Leftover range sieved by the coordinator itself when no worker is
    /// active, so the base table and partitions still tile [2, N]
    pub fn coordinator_tail(&self) -> Option<Partition> {
        if self.active > 0 || self.range_len() == 0 {
            return None;
        }
        Some(Partition::new(self.range_start(), self.bound))
    }

    pub fn partitions(&self) -> impl Iterator<Item = Partition> + '_ {
        (0..self.active).filter_map(|rank| self.partition(rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_even_split() {
        // N = 50: ceil_sqrt = 8, R = 42
        let plan = Plan::new(50, 3);
        assert_eq!(plan.active, 3);
        assert_eq!(plan.chunk, 14);
        assert_eq!(plan.remainder, 0);
        assert_eq!(plan.partition(0), Some(Partition::new(9, 22)));
        assert_eq!(plan.partition(1), Some(Partition::new(23, 36)));
        assert_eq!(plan.partition(2), Some(Partition::new(37, 50)));
        assert_eq!(plan.partition(3), None);
    }

    #[test]
    fn test_plan_last_rank_absorbs_remainder() {
        // N = 25: ceil_sqrt = 5, R = 20
        let plan = Plan::new(25, 3);
        assert_eq!(plan.active, 3);
        assert_eq!(plan.chunk, 6);
        assert_eq!(plan.remainder, 2);
        assert_eq!(plan.partition(0), Some(Partition::new(6, 11)));
        assert_eq!(plan.partition(1), Some(Partition::new(12, 17)));
        assert_eq!(plan.partition(2), Some(Partition::new(18, 25)));
    }

    #[test]
    fn test_plan_shrinks_when_chunks_too_narrow() {
        // N = 25, R = 20, 17 ranks launched -> 20 / 17 < 6
        let plan = Plan::new(25, 17);
        assert_eq!(plan.active, 3);
        assert_eq!(plan.chunk, 6);
        assert_eq!(plan.remainder, 2);
        assert_eq!(plan.excluded(17), 14);
        assert!(plan.is_active(2));
        assert!(!plan.is_active(3));
        assert!(plan.is_last(2));
    }

    #[test]
    fn test_plan_degenerate_range() {
        // N = 7: ceil_sqrt = 3, R = 4 < 6
        for bound in 2..=8 {
            let plan = Plan::new(bound, 4);
            assert_eq!(plan.active, 0, "bound {}", bound);
            assert_eq!(plan.remainder, plan.range_len());
            assert_eq!(plan.partitions().count(), 0);
            assert!(!plan.is_last(0));
            if bound > ceil_sqrt(bound) {
                assert_eq!(
                    plan.coordinator_tail(),
                    Some(Partition::new(ceil_sqrt(bound) + 1, bound))
                );
            }
        }
        assert_eq!(Plan::new(2, 4).coordinator_tail(), None);
        // N = 9 is the first bound with a full window
        assert_eq!(Plan::new(9, 4).active, 1);
        assert_eq!(Plan::new(9, 4).coordinator_tail(), None);
    }

    #[test]
    fn test_plan_zero_launched_is_treated_as_one() {
        let plan = Plan::new(100, 0);
        assert_eq!(plan.active, 1);
        assert_eq!(plan.partition(0), Some(Partition::new(11, 100)));
    }

    #[test]
    fn test_plan_invariants_hold_for_many_configurations() {
        for bound in 2..=600 {
            for launched in 1..=20 {
                let plan = Plan::new(bound, launched);
                assert!(plan.active <= launched);
                assert_eq!(
                    plan.active as u64 * plan.chunk + plan.remainder,
                    plan.range_len(),
                    "bound {} launched {}",
                    bound,
                    launched
                );
                for part in plan.partitions() {
                    assert!(part.len() as u64 >= PAIR_SPAN);
                }
            }
        }
    }

    #[test]
    fn test_partitions_cover_range_without_gaps_or_overlap() {
        for bound in 2..=2000 {
            for launched in [1, 2, 3, 4, 5, 8, 17, 64] {
                let plan = Plan::new(bound, launched);

                // Base table domain is 2..=ceil_sqrt(bound)
                let mut next = ceil_sqrt(bound) + 1;
                for part in plan.partitions().chain(plan.coordinator_tail()) {
                    assert_eq!(part.start, next, "gap before {:?}", part);
                    next = part.end + 1;
                }

                assert_eq!(next, bound + 1, "bound {} launched {}", bound, launched);
            }
        }
    }
}

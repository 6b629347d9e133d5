use crate::base::BaseTable;
use crate::partition::Partition;
use crate::planner::PAIR_SPAN;

/// Sieved primality flags for one rank's partition
///
/// Index mapping: flags[i] represents partition.local_to_global(i)
#[derive(Clone, Debug)]
pub struct Segment {
    partition: Partition,
    flags: Vec<bool>,
}

impl Segment {
    /// Segmented sieve over `partition` using the broadcast base primes
    ///
    /// - Memory: O(partition length)
    /// - Every multiple of a base prime inside the partition is struck, not
    ///   only those at or above p * p. The partition lies above ceil_sqrt(N),
    ///   so the first multiple is always at least 2p and p itself is never hit
    pub fn sieve(base: &BaseTable, partition: Partition) -> Self {
        let mut flags = vec![true; partition.len()];

        for p in base.primes() {
            let mut multiple = partition.start.div_ceil(p) * p;
            while multiple <= partition.end {
                flags[partition.global_to_local(multiple)] = false;
                multiple += p;
            }
        }

        Self { partition, flags }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn is_prime(&self, value: u64) -> bool {
        self.partition.contains(value) && self.flags[self.partition.global_to_local(value)]
    }

    pub fn primes(&self) -> impl Iterator<Item = u64> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|&(_, &prime)| prime)
            .map(|(i, _)| self.partition.local_to_global(i))
    }

    /// Pairs (p, p + 6) with both members inside this segment
    pub fn interior_pairs(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        interior_indices(&self.flags).map(|i| {
            let low = self.partition.local_to_global(i);
            (low, low + PAIR_SPAN)
        })
    }

    pub fn interior_count(&self) -> u64 {
        count_interior(&self.flags)
    }
}

/// Indices i with flags[i] and flags[i + 6] both set
pub fn interior_indices(flags: &[bool]) -> impl Iterator<Item = usize> + '_ {
    let span = PAIR_SPAN as usize;
    flags
        .windows(span + 1)
        .enumerate()
        .filter(move |(_, window)| window[0] && window[span])
        .map(|(i, _)| i)
}

/// Number of pairs fully inside one region of flags
pub fn count_interior(flags: &[bool]) -> u64 {
    interior_indices(flags).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ceil_sqrt;
    use crate::oracle;

    #[test]
    fn test_segment_sieve_matches_oracle() {
        let bound = 2000;
        let base = BaseTable::for_bound(bound);
        let reference = oracle::sieve(bound);

        let start = ceil_sqrt(bound) + 1;
        for (lo, hi) in [(start, 100), (101, 777), (778, 1999), (start, bound)] {
            let segment = Segment::sieve(&base, Partition::new(lo, hi));
            for value in lo..=hi {
                assert_eq!(
                    segment.is_prime(value),
                    reference[value as usize],
                    "value {} in [{}, {}]",
                    value,
                    lo,
                    hi
                );
            }
        }
    }

    #[test]
    fn test_segment_far_above_square_strikes_every_multiple() {
        // 49 = 7 * 7 sits inside, and 77 = 7 * 11 is far above 7 * 7
        let base = BaseTable::for_bound(100);
        let segment = Segment::sieve(&base, Partition::new(71, 80));
        let primes: Vec<u64> = segment.primes().collect();
        assert_eq!(primes, vec![71, 73, 79]);
    }

    #[test]
    fn test_interior_pairs() {
        let base = BaseTable::for_bound(50);
        let segment = Segment::sieve(&base, Partition::new(9, 50));
        let pairs: Vec<(u64, u64)> = segment.interior_pairs().collect();
        assert_eq!(
            pairs,
            vec![(11, 17), (13, 19), (17, 23), (23, 29), (31, 37), (37, 43), (41, 47)]
        );
        assert_eq!(segment.interior_count(), 7);
    }

    #[test]
    fn test_count_interior_short_regions() {
        assert_eq!(count_interior(&[]), 0);
        assert_eq!(count_interior(&[true; 6]), 0);
        assert_eq!(count_interior(&[true; 7]), 1);
        assert_eq!(count_interior(&[true; 8]), 2);
    }
}

/// First value represented by a base table (index 0 is the number 2)
pub const BASE_OFFSET: u64 = 2;

/// Smallest integer `s` with `s * s >= n`, computed without floating point
pub fn ceil_sqrt(n: u64) -> u64 {
    let s = n.isqrt();
    if s * s < n { s + 1 } else { s }
}

/// Primality flags for 2..=ceil_sqrt(N)
///
/// Built once by the coordinator and broadcast by value to every rank.
/// - Index mapping: flags[i] represents the number (i + 2)
/// - Immutable after construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseTable {
    flags: Vec<bool>,
}

impl BaseTable {
    /// Base table for the bound `n`, covering 2..=ceil_sqrt(n)
    pub fn for_bound(n: u64) -> Self {
        let len = ceil_sqrt(n).saturating_sub(1).max(1);
        Self::build(len as usize)
    }

    /// Classic Sieve of Eratosthenes over `len` flags (numbers 2..=len+1)
    ///
    /// - Time complexity: O(len log log len)
    /// - Multiples of each prime are struck starting at its square
    pub fn build(len: usize) -> Self {
        let mut flags = vec![true; len];
        let last = len as u64 + 1;

        let mut i = 0;
        while i < len {
            let p = i as u64 + BASE_OFFSET;
            if p * p > last {
                break;
            }
            if flags[i] {
                let mut j = p * p;
                while j <= last {
                    flags[(j - BASE_OFFSET) as usize] = false;
                    j += p;
                }
            }
            i += 1;
        }

        Self { flags }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Largest number covered by the table
    pub fn last_value(&self) -> u64 {
        self.flags.len() as u64 + 1
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn is_prime(&self, value: u64) -> bool {
        value >= BASE_OFFSET
            && self
                .flags
                .get((value - BASE_OFFSET) as usize)
                .copied()
                .unwrap_or(false)
    }

    /// Base primes in ascending order
    pub fn primes(&self) -> impl Iterator<Item = u64> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|&(_, &prime)| prime)
            .map(|(i, _)| i as u64 + BASE_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_sqrt() {
        assert_eq!(ceil_sqrt(2), 2);
        assert_eq!(ceil_sqrt(4), 2);
        assert_eq!(ceil_sqrt(5), 3);
        assert_eq!(ceil_sqrt(25), 5);
        assert_eq!(ceil_sqrt(26), 6);
        assert_eq!(ceil_sqrt(50), 8);
        assert_eq!(ceil_sqrt(1_000_000), 1000);
        assert_eq!(ceil_sqrt(1_000_001), 1001);
    }

    #[test]
    fn test_base_table_small() {
        // 2 3 4 5 6 7 8
        let table = BaseTable::build(7);
        assert_eq!(
            table.flags(),
            &[true, true, false, true, false, true, false]
        );
        assert_eq!(table.last_value(), 8);
    }

    #[test]
    fn test_base_table_primes_up_to_100() {
        let table = BaseTable::build(99);
        let primes: Vec<u64> = table.primes().collect();
        assert_eq!(
            primes,
            vec![
                2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73,
                79, 83, 89, 97
            ]
        );
    }

    #[test]
    fn test_base_table_for_bound() {
        // N = 25 -> 2..=5
        let table = BaseTable::for_bound(25);
        assert_eq!(table.len(), 4);
        assert_eq!(table.last_value(), 5);
        assert!(table.is_prime(5));
        assert!(!table.is_prime(4));
        assert!(!table.is_prime(6));
        assert!(!table.is_prime(1));

        // N = 2 still yields the single entry for 2
        let table = BaseTable::for_bound(2);
        assert_eq!(table.flags(), &[true]);
    }

    #[test]
    fn test_base_table_is_idempotent() {
        for len in [1, 2, 7, 31, 500, 4096] {
            assert_eq!(BaseTable::build(len), BaseTable::build(len));
        }
    }
}

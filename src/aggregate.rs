use std::ops::{Add, AddAssign};

use log::debug;

use crate::comm::{CommError, Communicator};

/// Partial pair counts, summed component-wise by the reduction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PairTally {
    /// Pairs with both members inside one partition
    pub interior: u64,
    /// Pairs straddling two adjacent partitions
    pub boundary: u64,
    /// Pairs inside the base table or straddling its upper edge
    pub base: u64,
}

impl PairTally {
    pub fn total(&self) -> u64 {
        self.interior + self.boundary + self.base
    }
}

impl Add for PairTally {
    type Output = PairTally;

    fn add(self, other: PairTally) -> PairTally {
        PairTally {
            interior: self.interior + other.interior,
            boundary: self.boundary + other.boundary,
            base: self.base + other.base,
        }
    }
}

impl AddAssign for PairTally {
    fn add_assign(&mut self, other: PairTally) {
        *self = *self + other;
    }
}

impl std::iter::Sum for PairTally {
    fn sum<I: Iterator<Item = PairTally>>(iter: I) -> PairTally {
        iter.fold(PairTally::default(), Add::add)
    }
}

/// Collective reduction of every active rank's tally into the coordinator
///
/// Every member of `comm` must call this exactly once.
pub fn aggregate(comm: &mut Communicator, local: PairTally) -> Result<Option<PairTally>, CommError> {
    debug!(
        "rank {}: interior {} boundary {} base {}",
        comm.rank(),
        local.interior,
        local.boundary,
        local.base
    );
    comm.reduce_sum(0, local)
}

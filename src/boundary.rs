use log::debug;

use crate::base::BaseTable;
use crate::comm::{CommError, Communicator, Payload, Tag};
use crate::planner::{PAIR_SPAN, Plan};
use crate::segment::Segment;

const WIDTH: usize = PAIR_SPAN as usize;

/// Last six flags of a region, sent rightward once per run
///
/// flags[i] represents the value `last - 5 + i`. A region shorter than six
/// pads the low side with `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundarySlice {
    pub last: u64,
    pub flags: [bool; WIDTH],
}

impl BoundarySlice {
    /// Slice from the tail of `region`, whose final entry is the value `last`
    pub fn from_tail(region: &[bool], last: u64) -> Self {
        let mut flags = [false; WIDTH];
        let take = region.len().min(WIDTH);
        flags[WIDTH - take..].copy_from_slice(&region[region.len() - take..]);
        Self { last, flags }
    }

    pub fn from_base(base: &BaseTable) -> Self {
        Self::from_tail(base.flags(), base.last_value())
    }

    pub fn from_segment(segment: &Segment) -> Self {
        Self::from_tail(segment.flags(), segment.partition().end)
    }

    /// Pairs (p, p + 6) with p in this slice and p + 6 in the first six
    /// entries of the next region, which starts at `last + 1`
    ///
    /// A head shorter than six only happens at the top of the range; the
    /// missing entries lie above N and never count.
    pub fn stitch<'a>(&'a self, head: &'a [bool]) -> impl Iterator<Item = (u64, u64)> + 'a {
        self.flags
            .iter()
            .zip(head.iter())
            .enumerate()
            .filter(|&(_, (&left, &right))| left && right)
            .map(move |(i, _)| {
                let high = self.last + 1 + i as u64;
                (high - PAIR_SPAN, high)
            })
    }

    pub fn stitch_count(&self, head: &[bool]) -> u64 {
        self.stitch(head).count() as u64
    }
}

fn head(segment: &Segment) -> &[bool] {
    let flags = segment.flags();
    &flags[..flags.len().min(WIDTH)]
}

/// Count pairs straddling the base table and the first segment
pub fn reconcile_base(base: &BaseTable, first: &Segment) -> u64 {
    let slice = BoundarySlice::from_base(base);
    let mut count = 0;
    for (low, high) in slice.stitch(head(first)) {
        debug!("pair across base boundary: ({}, {})", low, high);
        count += 1;
    }
    count
}

/// Pipelined exchange of boundary slices, rank i -> rank i + 1
///
/// Every rank but the last sends its tail; every rank but the first
/// receives its left neighbour's tail and counts the pairs crossing into its
/// own head. Sends never block, so the pipeline cannot deadlock.
pub fn exchange(comm: &mut Communicator, plan: &Plan, segment: &Segment) -> Result<u64, CommError> {
    let rank = comm.rank();

    if !plan.is_last(rank) {
        let slice = BoundarySlice::from_segment(segment);
        comm.send(rank + 1, Payload::Boundary(slice))?;
    }

    if rank == 0 {
        return Ok(0);
    }

    let slice = comm.recv(rank - 1, Tag::Boundary)?.into_boundary()?;
    let mut count = 0;
    for (low, high) in slice.stitch(head(segment)) {
        debug!("rank {}: pair across partitions: ({}, {})", rank, low, high);
        count += 1;
    }

    Ok(count)
}

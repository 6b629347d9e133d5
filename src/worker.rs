use log::{debug, info};

use crate::aggregate::{PairTally, aggregate};
use crate::base::BaseTable;
use crate::boundary::{self, BoundarySlice};
use crate::comm::{self, Communicator, Payload, RunError, Tag};
use crate::planner::Plan;
use crate::segment::{Segment, count_interior};

const COORDINATOR: usize = 0;

/// Lifecycle of one rank, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Init,
    Base,
    Plan,
    Sieve,
    Exchange,
    Reduce,
    Report,
    Terminate,
}

fn enter(rank: usize, stage: Stage) {
    debug!("rank {}: {:?}", rank, stage);
}

/// Count sexy pairs up to `bound` across `launched` ranks
///
/// Returns the coordinator's reduced tally.
pub fn count_sexy_pairs(bound: u64, launched: usize) -> Result<PairTally, RunError> {
    let results = comm::launch(launched, |comm| run_rank(comm, bound))?;
    results
        .into_iter()
        .next()
        .flatten()
        .ok_or(RunError::NoResult)
}

/// One rank's pass through the state machine
///
/// Only the coordinator builds the base table and plans; ranks the plan
/// excludes leave right after PLAN. The coordinator returns `Some(total)`,
/// everyone else `None`.
pub fn run_rank(mut comm: Communicator, bound: u64) -> Result<Option<PairTally>, RunError> {
    let rank = comm.rank();
    let launched = comm.size();
    enter(rank, Stage::Init);

    enter(rank, Stage::Base);
    let base = comm.is_root().then(|| {
        let base = BaseTable::for_bound(bound);
        info!(
            "coordinator built base table 2..={} ({} primes)",
            base.last_value(),
            base.primes().count()
        );
        Payload::Base(base)
    });
    let base = comm.broadcast(COORDINATOR, Tag::Base, base)?.into_base()?;

    enter(rank, Stage::Plan);
    let plan = comm.is_root().then(|| {
        let plan = Plan::new(bound, launched);
        info!(
            "plan: {} active of {} launched, chunk {}, remainder {}",
            plan.active,
            launched,
            plan.chunk,
            plan.remainder
        );
        if plan.excluded(launched) > 0 {
            info!("retiring ranks {}..{}", plan.active, launched);
        }
        Payload::Plan(plan)
    });
    let plan = comm.broadcast(COORDINATOR, Tag::Plan, plan)?.into_plan()?;

    if plan.active == 0 {
        // Nobody sieves; the coordinator covers the short tail on its own
        if !comm.is_root() {
            enter(rank, Stage::Terminate);
            return Ok(None);
        }
        let tally = coordinate_alone(&base, &plan);
        enter(rank, Stage::Report);
        enter(rank, Stage::Terminate);
        return Ok(Some(tally));
    }

    let Some(mut comm) = comm.retain(plan.active) else {
        enter(rank, Stage::Terminate);
        return Ok(None);
    };

    enter(rank, Stage::Sieve);
    let partition = plan
        .partition(rank)
        .ok_or(RunError::Unplanned { rank })?;
    debug!("rank {}: partition [{}, {}]", rank, partition.start, partition.end);
    let segment = Segment::sieve(&base, partition);

    let mut local = PairTally {
        interior: segment.interior_count(),
        ..PairTally::default()
    };
    for (low, high) in segment.interior_pairs() {
        debug!("rank {}: pair inside partition: ({}, {})", rank, low, high);
    }

    enter(rank, Stage::Exchange);
    local.boundary = boundary::exchange(&mut comm, &plan, &segment)?;
    if comm.is_root() {
        local.base = count_interior(base.flags()) + boundary::reconcile_base(&base, &segment);
    }

    enter(rank, Stage::Reduce);
    let total = aggregate(&mut comm, local)?;

    if total.is_some() {
        enter(rank, Stage::Report);
    }
    enter(rank, Stage::Terminate);
    Ok(total)
}

/// Coordinator-only count when the range above the base table is too
/// short for any worker
fn coordinate_alone(base: &BaseTable, plan: &Plan) -> PairTally {
    let mut tally = PairTally {
        base: count_interior(base.flags()),
        ..PairTally::default()
    };

    if let Some(tail) = plan.coordinator_tail() {
        let segment = Segment::sieve(base, tail);
        tally.interior = segment.interior_count();
        tally.base += BoundarySlice::from_base(base).stitch_count(segment.flags());
    }

    tally
}

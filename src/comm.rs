use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::trace;

use crate::aggregate::PairTally;
use crate::base::BaseTable;
use crate::boundary::BoundarySlice;
pub use crate::error::{CommError, RunError};
use crate::planner::Plan;

/// Message kinds, used to match receives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Base,
    Plan,
    Boundary,
    Reduce,
}

/// Everything that travels between ranks
#[derive(Clone, Debug)]
pub enum Payload {
    Base(BaseTable),
    Plan(Plan),
    Boundary(BoundarySlice),
    Tally(PairTally),
}

impl Payload {
    pub fn tag(&self) -> Tag {
        match self {
            Payload::Base(_) => Tag::Base,
            Payload::Plan(_) => Tag::Plan,
            Payload::Boundary(_) => Tag::Boundary,
            Payload::Tally(_) => Tag::Reduce,
        }
    }

    pub fn into_base(self) -> Result<BaseTable, CommError> {
        match self {
            Payload::Base(base) => Ok(base),
            other => Err(unexpected(Tag::Base, &other)),
        }
    }

    pub fn into_plan(self) -> Result<Plan, CommError> {
        match self {
            Payload::Plan(plan) => Ok(plan),
            other => Err(unexpected(Tag::Plan, &other)),
        }
    }

    pub fn into_boundary(self) -> Result<BoundarySlice, CommError> {
        match self {
            Payload::Boundary(slice) => Ok(slice),
            other => Err(unexpected(Tag::Boundary, &other)),
        }
    }

    pub fn into_tally(self) -> Result<PairTally, CommError> {
        match self {
            Payload::Tally(tally) => Ok(tally),
            other => Err(unexpected(Tag::Reduce, &other)),
        }
    }
}

fn unexpected(expected: Tag, got: &Payload) -> CommError {
    CommError::UnexpectedPayload {
        expected,
        got: got.tag(),
    }
}

struct Envelope {
    source: usize,
    payload: Payload,
}

/// One rank's handle on the process group
///
/// Ranks share nothing but channels. Each rank owns its inbox and a sender
/// to every other member; messages that arrive before they are asked for
/// are parked until a matching receive.
pub struct Communicator {
    rank: usize,
    size: usize,
    peers: Vec<Option<Sender<Envelope>>>,
    inbox: Receiver<Envelope>,
    pending: VecDeque<Envelope>,
}

impl Communicator {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_root(&self) -> bool {
        self.rank == 0
    }

    pub fn send(&self, dest: usize, payload: Payload) -> Result<(), CommError> {
        let peer = self
            .peers
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or(CommError::Disconnected { rank: dest })?;

        trace!("rank {} -> rank {}: {:?}", self.rank, dest, payload.tag());
        peer.send(Envelope {
            source: self.rank,
            payload,
        })
        .map_err(|_| CommError::Disconnected { rank: dest })
    }

    /// Block until a message with `tag` from `source` arrives
    pub fn recv(&mut self, source: usize, tag: Tag) -> Result<Payload, CommError> {
        let matches = |env: &Envelope| env.source == source && env.payload.tag() == tag;

        if let Some(pos) = self.pending.iter().position(matches) {
            if let Some(env) = self.pending.remove(pos) {
                return Ok(env.payload);
            }
        }

        loop {
            let env = self
                .inbox
                .recv()
                .map_err(|_| CommError::Disconnected { rank: source })?;
            if matches(&env) {
                trace!("rank {} <- rank {}: {:?}", self.rank, source, tag);
                return Ok(env.payload);
            }
            self.pending.push_back(env);
        }
    }

    /// Root hands a copy of `value` to every member; everyone returns it
    pub fn broadcast(
        &mut self,
        root: usize,
        tag: Tag,
        value: Option<Payload>,
    ) -> Result<Payload, CommError> {
        if self.rank != root {
            return self.recv(root, tag);
        }

        let value = value.ok_or(CommError::MissingRootValue { root })?;
        for dest in (0..self.size).filter(|&dest| dest != root) {
            self.send(dest, value.clone())?;
        }
        Ok(value)
    }

    /// Sum every member's tally at `root`; only the root gets `Some`
    pub fn reduce_sum(
        &mut self,
        root: usize,
        tally: PairTally,
    ) -> Result<Option<PairTally>, CommError> {
        if self.rank != root {
            self.send(root, Payload::Tally(tally))?;
            return Ok(None);
        }

        let mut total = tally;
        for source in (0..self.size).filter(|&source| source != root) {
            total += self.recv(source, Tag::Reduce)?.into_tally()?;
        }
        Ok(Some(total))
    }

    /// Split the group down to ranks 0..active
    ///
    /// Every rank calls this with the same `active`. Ranks outside get
    /// `None` and drop their handle; later collectives only involve the
    /// remaining members.
    pub fn retain(mut self, active: usize) -> Option<Self> {
        if self.rank >= active {
            return None;
        }
        self.size = active;
        self.peers.truncate(active);
        Some(self)
    }
}

/// Run `f` once per rank on its own thread and collect results in rank order
///
/// A rank that returns an error or panics fails the whole run.
pub fn launch<T, F>(size: usize, f: F) -> Result<Vec<T>, RunError>
where
    T: Send,
    F: Fn(Communicator) -> Result<T, RunError> + Sync,
{
    let size = size.max(1);
    let (senders, inboxes): (Vec<_>, Vec<_>) = (0..size).map(|_| mpsc::channel()).unzip();

    let comms: Vec<Communicator> = inboxes
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| Communicator {
            rank,
            size,
            peers: senders
                .iter()
                .enumerate()
                .map(|(peer, tx)| (peer != rank).then(|| tx.clone()))
                .collect(),
            inbox,
            pending: VecDeque::new(),
        })
        .collect();
    drop(senders);

    let f = &f;
    thread::scope(|scope| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| scope.spawn(move || f(comm)))
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .map_err(|_| RunError::RankPanicked { rank })?
            })
            .collect()
    })
}

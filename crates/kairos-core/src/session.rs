//! Session-owned agent state.
//!
//! [`DashboardState`] is the only writer of the shared [`AgentState`]. Polls
//! replace the snapshot wholesale and are authoritative; the countdown tick
//! only ever decrements `time_until_next` between polls.

use crate::AgentState;

/// Issue-order sequence number attached to every status request.
pub type RequestSeq = u64;

/// Hands out strictly increasing request sequence numbers, starting at 1.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    last: RequestSeq,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestSeq {
        self.last += 1;
        self.last
    }

    pub fn last_issued(&self) -> RequestSeq {
        self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied,
    /// A response from a later request was already applied.
    Stale { applied: RequestSeq },
}

#[derive(Debug, Default)]
pub struct DashboardState {
    agent: AgentState,
    applied_seq: Option<RequestSeq>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    /// Sequence of the snapshot currently shown, if any poll has landed yet.
    pub fn applied_seq(&self) -> Option<RequestSeq> {
        self.applied_seq
    }

    pub fn has_snapshot(&self) -> bool {
        self.applied_seq.is_some()
    }

    /// Replaces the whole agent state with `snapshot` unless a response to a
    /// later request has already been applied.
    pub fn apply_poll(&mut self, seq: RequestSeq, snapshot: AgentState) -> PollOutcome {
        if let Some(applied) = self.applied_seq {
            if seq <= applied {
                return PollOutcome::Stale { applied };
            }
        }
        self.agent = snapshot;
        self.applied_seq = Some(seq);
        PollOutcome::Applied
    }

    /// One countdown step. Returns `true` when the countdown moved.
    pub fn tick_countdown(&mut self) -> bool {
        if !self.agent.running || self.agent.time_until_next == 0 {
            return false;
        }
        self.agent.time_until_next -= 1;
        true
    }
}

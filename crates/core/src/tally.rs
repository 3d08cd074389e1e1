//! Running vote total.

use crate::CandidateRegistry;
use serde::{Deserialize, Serialize};

/// Total votes across live candidates. Only vote casting and candidate
/// deletion move it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyLedger {
    total: u64,
}

impl TallyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether the running total matches the per-candidate counts.
    pub fn is_consistent_with(&self, candidates: &CandidateRegistry) -> bool {
        self.total == Self::recount(candidates)
    }

    /// Sum of live vote counts.
    pub fn recount(candidates: &CandidateRegistry) -> u64 {
        candidates.live().map(|c| c.vote_count).sum()
    }

    pub(crate) fn record_vote(&mut self) {
        self.total += 1;
    }

    /// Remove a deleted candidate's votes. The registry never holds more
    /// votes for one candidate than the total, so this cannot underflow.
    pub(crate) fn retract(&mut self, votes: u64) {
        self.total -= votes;
    }
}

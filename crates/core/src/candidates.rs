//! Candidate arena.
//!
//! Slot `id - 1` holds candidate `id`. Deleted slots stay in place as
//! tombstones so an id is a permanent handle.

use crate::{CandidateId, Error};
use serde::{Deserialize, Serialize};

/// A candidate slot. Tombstones keep their id but lose name and count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
    pub exists: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRegistry {
    slots: Vec<Candidate>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live candidate.
    pub fn get(&self, id: CandidateId) -> Result<&Candidate, Error> {
        let slot = self.slot(id)?;
        if !slot.exists {
            return Err(Error::CandidateDeleted(id));
        }
        Ok(slot)
    }

    /// Live candidates in id order.
    pub fn live(&self) -> impl Iterator<Item = &Candidate> {
        self.slots.iter().filter(|c| c.exists)
    }

    /// Every slot ever allocated, tombstones included.
    pub fn slots(&self) -> &[Candidate] {
        &self.slots
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Highest id ever allocated, or 0 when none has been.
    pub fn highest_id(&self) -> CandidateId {
        CandidateId(self.slots.len() as u64)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Candidate> {
        self.live().find(|c| c.name == name)
    }

    /// Check that `name` could be added right now.
    pub fn check_name(&self, name: &str) -> Result<(), Error> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.find_by_name(name).is_some() {
            return Err(Error::DuplicateCandidate(name.to_string()));
        }
        Ok(())
    }

    /// Allocate the next id. Callers must have run [`check_name`](Self::check_name).
    pub(crate) fn push(&mut self, name: String) -> CandidateId {
        let id = CandidateId(self.slots.len() as u64 + 1);
        self.slots.push(Candidate {
            id,
            name,
            vote_count: 0,
            exists: true,
        });
        id
    }

    /// Tombstone a live candidate and return the votes it held.
    pub(crate) fn tombstone(&mut self, id: CandidateId) -> Result<u64, Error> {
        self.get(id)?;
        let slot = self.slot_mut(id)?;
        let votes = slot.vote_count;
        slot.exists = false;
        slot.name.clear();
        slot.vote_count = 0;
        Ok(votes)
    }

    pub(crate) fn increment(&mut self, id: CandidateId) -> Result<u64, Error> {
        self.get(id)?;
        let slot = self.slot_mut(id)?;
        slot.vote_count += 1;
        Ok(slot.vote_count)
    }

    fn slot(&self, id: CandidateId) -> Result<&Candidate, Error> {
        let index = Self::index(id)?;
        self.slots.get(index).ok_or(Error::InvalidCandidate(id))
    }

    fn slot_mut(&mut self, id: CandidateId) -> Result<&mut Candidate, Error> {
        let index = Self::index(id)?;
        self.slots.get_mut(index).ok_or(Error::InvalidCandidate(id))
    }

    fn index(id: CandidateId) -> Result<usize, Error> {
        id.0
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or(Error::InvalidCandidate(id))
    }
}

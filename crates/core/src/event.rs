//! Ordered, hash-chained log of committed mutations.
//!
//! Each record's digest is `BLAKE3(prev_digest || CBOR(seq, event))`, so an
//! observer holding the latest digest can detect any rewrite of history.

use crate::{Address, CandidateId, Error, Hash, Timestamp};
use serde::{Deserialize, Serialize};

/// What a successful operation did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    AdminAdded {
        admin: Address,
    },
    AdminRemoved {
        admin: Address,
    },
    CandidateAdded {
        id: CandidateId,
        name: String,
    },
    CandidateRemoved {
        id: CandidateId,
    },
    VoterRegistered {
        voter: Address,
    },
    VotingStarted {
        duration_minutes: u64,
        end_time: Timestamp,
    },
    VotingEnded,
    VoteCast {
        voter: Address,
        candidate: CandidateId,
    },
}

/// An event with its position and chain digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub event: Event,
    pub digest: Hash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq >= cursor`. A listener passes the next sequence
    /// number it has not yet seen.
    pub fn since(&self, cursor: u64) -> &[EventRecord] {
        let start = usize::try_from(cursor)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Digest of the latest record, or the zero hash for an empty log.
    pub fn head(&self) -> Hash {
        self.records.last().map(|r| r.digest).unwrap_or(Hash::ZERO)
    }

    /// Build the record that appending `event` would produce.
    pub fn seal(&self, event: Event) -> Result<EventRecord, Error> {
        let seq = self.records.len() as u64;
        let digest = self.head().chain(&(seq, &event))?;
        Ok(EventRecord { seq, event, digest })
    }

    /// Append a record produced by [`seal`](Self::seal) on this log.
    pub(crate) fn push(&mut self, record: EventRecord) {
        debug_assert_eq!(record.seq, self.records.len() as u64);
        self.records.push(record);
    }

    /// Recompute the chain and compare it with the stored digests.
    pub fn verify(&self) -> Result<(), Error> {
        let mut prev = Hash::ZERO;
        for (i, record) in self.records.iter().enumerate() {
            if record.seq != i as u64 {
                return Err(Error::Integrity(format!(
                    "event {} carries sequence number {}",
                    i, record.seq
                )));
            }
            let expected = prev.chain(&(record.seq, &record.event))?;
            if expected != record.digest {
                return Err(Error::Integrity(format!("event {} digest mismatch", i)));
            }
            prev = expected;
        }
        Ok(())
    }
}

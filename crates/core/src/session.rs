//! The voting window.
//!
//! `Inactive -> Active -> Inactive`. Expiry is not a transition: once
//! `now > end_time` votes fail, but the flag stays set until an admin ends
//! the session.

use crate::{Error, Timestamp};
use serde::{Deserialize, Serialize};

/// Session phase as seen by a caller at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Never started, or ended by an admin.
    Inactive,
    /// Accepting votes.
    Open,
    /// Flag still set but the end time has passed.
    Expired,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSession {
    active: bool,
    end_time: Option<Timestamp>,
}

impl VotingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// End time of the current or most recent session.
    pub fn end_time(&self) -> Option<Timestamp> {
        self.end_time
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        match (self.active, self.end_time) {
            (false, _) => Phase::Inactive,
            (true, Some(end)) if now > end => Phase::Expired,
            (true, _) => Phase::Open,
        }
    }

    /// Fail when candidates may not be touched.
    pub fn require_inactive(&self, action: &'static str) -> Result<(), Error> {
        if self.active {
            Err(Error::VotingActive(action))
        } else {
            Ok(())
        }
    }

    /// Fail unless a vote may be cast at `now`.
    pub fn require_open(&self, now: Timestamp) -> Result<(), Error> {
        match (self.phase(now), self.end_time) {
            (Phase::Inactive, _) => Err(Error::VotingInactive),
            (Phase::Expired, Some(end_time)) => Err(Error::VotingPeriodEnded { end_time, now }),
            _ => Ok(()),
        }
    }

    /// Compute the end time a start at `now` would get, checking the
    /// phase and duration without touching state.
    pub fn plan_start(&self, now: Timestamp, duration_minutes: u64) -> Result<Timestamp, Error> {
        if self.active {
            return Err(Error::AlreadyActive);
        }
        if duration_minutes == 0 {
            return Err(Error::InvalidDuration(duration_minutes));
        }
        duration_minutes
            .checked_mul(60)
            .and_then(|secs| now.checked_add(secs))
            .ok_or(Error::InvalidDuration(duration_minutes))
    }

    pub fn require_active(&self) -> Result<(), Error> {
        if self.active {
            Ok(())
        } else {
            Err(Error::VotingInactive)
        }
    }

    pub(crate) fn open(&mut self, end_time: Timestamp) {
        self.active = true;
        self.end_time = Some(end_time);
    }

    pub(crate) fn close(&mut self) {
        self.active = false;
    }
}

//! Error types for ezballot-core.

use thiserror::Error;

use crate::{Address, CandidateId, Timestamp};

/// Broad failure classes a caller can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the owner/admin privilege (or eligibility) the operation needs.
    Authorization,
    /// Operation attempted in the wrong session phase.
    InvalidState,
    /// Malformed or duplicate input.
    Validation,
    /// Reference to a candidate that was never allocated or has been deleted.
    NotFound,
    /// Vote after the natural end of the session.
    Expired,
    /// Snapshot could not be encoded or decoded.
    Codec,
    /// A loaded snapshot violates a ledger invariant.
    Integrity,
}

/// Core errors. Every variant aborts the operation with no state change.
#[derive(Debug, Error)]
pub enum Error {
    /// Owner-only operation called by someone else.
    #[error("only the owner can call this function (caller {0})")]
    NotOwner(Address),

    /// Admin-only operation called by a non-admin.
    #[error("only an admin can call this function (caller {0})")]
    NotAdmin(Address),

    /// Registration under a self-service policy for a different address.
    #[error("{caller} cannot register {target}: voters may only register themselves")]
    NotSelf { caller: Address, target: Address },

    /// Voting requires registration and the caller is not registered.
    #[error("voter {0} is not registered")]
    NotRegistered(Address),

    /// Candidate mutation while the session is active.
    #[error("cannot {0} candidates during active voting")]
    VotingActive(&'static str),

    /// Start requested while already active.
    #[error("voting is already active")]
    AlreadyActive,

    /// Vote or end requested while inactive.
    #[error("voting is not active")]
    VotingInactive,

    /// Start requested with no live candidates.
    #[error("no candidates added")]
    NoCandidates,

    /// Start requested with a zero or unrepresentable duration.
    #[error("invalid voting duration: {0} minutes")]
    InvalidDuration(u64),

    /// Register called while the ledger runs without voter registration.
    #[error("voter registration is disabled for this election")]
    RegistrationDisabled,

    /// Candidate name empty after trimming.
    #[error("candidate name must not be empty")]
    EmptyName,

    /// A live candidate already has this name.
    #[error("candidate already exists: {0}")]
    DuplicateCandidate(String),

    /// Voter registered twice.
    #[error("voter {0} is already registered")]
    AlreadyRegistered(Address),

    /// Second vote from the same caller.
    #[error("voter {0} has already voted")]
    AlreadyVoted(Address),

    /// Address string that is not `0x` followed by 40 hex digits.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Id outside the ever-allocated range.
    #[error("invalid candidate id: {0}")]
    InvalidCandidate(CandidateId),

    /// Id that has been tombstoned.
    #[error("candidate {0} has been deleted")]
    CandidateDeleted(CandidateId),

    /// Vote after the end time while the flag is still set.
    #[error("voting period has ended (ended at {end_time}, now {now})")]
    VotingPeriodEnded { end_time: Timestamp, now: Timestamp },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Snapshot failed verification.
    #[error("ledger integrity violated: {0}")]
    Integrity(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotOwner(_)
            | Error::NotAdmin(_)
            | Error::NotSelf { .. }
            | Error::NotRegistered(_) => ErrorKind::Authorization,
            Error::VotingActive(_)
            | Error::AlreadyActive
            | Error::VotingInactive
            | Error::NoCandidates
            | Error::InvalidDuration(_)
            | Error::RegistrationDisabled => ErrorKind::InvalidState,
            Error::EmptyName
            | Error::DuplicateCandidate(_)
            | Error::AlreadyRegistered(_)
            | Error::AlreadyVoted(_)
            | Error::InvalidAddress(_) => ErrorKind::Validation,
            Error::InvalidCandidate(_) | Error::CandidateDeleted(_) => ErrorKind::NotFound,
            Error::VotingPeriodEnded { .. } => ErrorKind::Expired,
            Error::Serialization(_) => ErrorKind::Codec,
            Error::Integrity(_) => ErrorKind::Integrity,
        }
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

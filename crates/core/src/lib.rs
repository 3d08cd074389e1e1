//! ezballot-core: the election ledger state machine.
//!
//! A single [`Ledger`] owns five components:
//! - `AccessControl`: the fixed owner and the admin set
//! - `CandidateRegistry`: sequential ids with permanent tombstones
//! - `VoterRegistry`: registration flags and the one-vote record
//! - `VotingSession`: the active flag and end time gating every mutation
//! - `TallyLedger`: the running total, kept equal to the live per-candidate sum
//!
//! Operations take the caller identity and, where time matters, the current
//! timestamp as explicit arguments. Each one either commits fully and
//! appends to the hash-chained [`EventLog`], or fails with no state change.

mod access;
mod candidates;
mod error;
mod event;
mod hash;
mod ledger;
mod session;
mod tally;
mod types;
mod voters;

pub use access::AccessControl;
pub use candidates::{Candidate, CandidateRegistry};
pub use error::{Error, ErrorKind};
pub use event::{Event, EventLog, EventRecord};
pub use hash::Hash;
pub use ledger::Ledger;
pub use session::{Phase, VotingSession};
pub use tally::TallyLedger;
pub use types::{Address, CandidateId, Timestamp};
pub use voters::{RegistrationPolicy, Voter, VoterRegistry};

//! Voter eligibility and the one-vote record.

use crate::{Address, CandidateId, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who may register voters, fixed when the ledger is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationPolicy {
    /// Any address may vote; registration is rejected.
    #[default]
    Disabled,
    /// Admins register addresses; only registered addresses may vote.
    AdminManaged,
    /// Each address registers itself; only registered addresses may vote.
    SelfService,
}

impl RegistrationPolicy {
    pub fn requires_registration(self) -> bool {
        !matches!(self, RegistrationPolicy::Disabled)
    }
}

/// Per-address state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub registered: bool,
    /// Set exactly once, when the vote is cast.
    pub voted_for: Option<CandidateId>,
}

impl Voter {
    pub fn has_voted(&self) -> bool {
        self.voted_for.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRegistry {
    policy: RegistrationPolicy,
    voters: BTreeMap<Address, Voter>,
}

impl VoterRegistry {
    pub fn new(policy: RegistrationPolicy) -> Self {
        Self {
            policy,
            voters: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    pub fn get(&self, address: &Address) -> Option<&Voter> {
        self.voters.get(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Voter)> {
        self.voters.iter()
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.voters.get(address).is_some_and(|v| v.registered)
    }

    pub fn voted_for(&self, address: &Address) -> Option<CandidateId> {
        self.voters.get(address).and_then(|v| v.voted_for)
    }

    /// Check that `target` may be registered now. Authorization of the
    /// caller against the policy happens in the ledger, which knows the admins.
    pub fn check_register(&self, target: &Address) -> Result<(), Error> {
        if !self.policy.requires_registration() {
            return Err(Error::RegistrationDisabled);
        }
        if self.is_registered(target) {
            return Err(Error::AlreadyRegistered(*target));
        }
        Ok(())
    }

    /// Check that `voter` may cast a ballot.
    pub fn check_ballot(&self, voter: &Address) -> Result<(), Error> {
        if self.policy.requires_registration() && !self.is_registered(voter) {
            return Err(Error::NotRegistered(*voter));
        }
        if self.voted_for(voter).is_some() {
            return Err(Error::AlreadyVoted(*voter));
        }
        Ok(())
    }

    pub(crate) fn register(&mut self, target: Address) {
        self.voters.entry(target).or_default().registered = true;
    }

    pub(crate) fn record_ballot(&mut self, voter: Address, candidate: CandidateId) {
        self.voters.entry(voter).or_default().voted_for = Some(candidate);
    }
}

//! Owner and admin bookkeeping.

use crate::{Address, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The fixed owner plus a mutable admin set managed by the owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    admins: BTreeSet<Address>,
}

impl AccessControl {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            admins: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    /// The owner is always an admin, whether or not it is in the set.
    pub fn is_admin(&self, caller: &Address) -> bool {
        self.is_owner(caller) || self.admins.contains(caller)
    }

    /// Explicitly appointed admins (the owner is not listed).
    pub fn admins(&self) -> impl Iterator<Item = &Address> {
        self.admins.iter()
    }

    pub fn require_owner(&self, caller: &Address) -> Result<(), Error> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(Error::NotOwner(*caller))
        }
    }

    pub fn require_admin(&self, caller: &Address) -> Result<(), Error> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(Error::NotAdmin(*caller))
        }
    }

    /// Returns false when the target already had admin rights.
    pub(crate) fn insert(&mut self, target: Address) -> bool {
        if self.is_owner(&target) {
            return false;
        }
        self.admins.insert(target)
    }

    /// Returns false when the target was not in the set.
    pub(crate) fn remove(&mut self, target: &Address) -> bool {
        self.admins.remove(target)
    }
}

//! The election ledger: one owned aggregate, one set of invariants.
//!
//! Every mutating operation runs all of its checks first, seals its event,
//! and only then touches state. A failed call leaves the ledger exactly as
//! it was.

use crate::{
    AccessControl, Address, Candidate, CandidateId, CandidateRegistry, Error, Event, EventLog,
    EventRecord, Hash, Phase, RegistrationPolicy, TallyLedger, Timestamp, Voter, VoterRegistry,
    VotingSession,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    access: AccessControl,
    candidates: CandidateRegistry,
    voters: VoterRegistry,
    session: VotingSession,
    tally: TallyLedger,
    events: EventLog,
}

impl Ledger {
    /// Create a ledger owned by `owner`, with no candidates and an
    /// inactive session.
    pub fn new(owner: Address, policy: RegistrationPolicy) -> Self {
        info!(%owner, ?policy, "ledger created");
        Self::empty(owner, policy)
    }

    fn empty(owner: Address, policy: RegistrationPolicy) -> Self {
        Self {
            access: AccessControl::new(owner),
            candidates: CandidateRegistry::new(),
            voters: VoterRegistry::new(policy),
            session: VotingSession::new(),
            tally: TallyLedger::new(),
            events: EventLog::new(),
        }
    }

    // =========================================================================
    // Access control
    // =========================================================================

    /// Grant admin rights. Returns false if `target` already had them.
    pub fn add_admin(&mut self, caller: &Address, target: Address) -> Result<bool, Error> {
        self.access
            .require_owner(caller)
            .inspect_err(|e| debug!(%caller, error = %e, "add_admin rejected"))?;

        if self.access.is_admin(&target) {
            return Ok(false);
        }

        self.commit(Event::AdminAdded { admin: target })?;
        info!(%target, "admin added");
        Ok(true)
    }

    /// Revoke admin rights. Removing a non-member is a no-op returning false.
    pub fn remove_admin(&mut self, caller: &Address, target: &Address) -> Result<bool, Error> {
        self.access
            .require_owner(caller)
            .inspect_err(|e| debug!(%caller, error = %e, "remove_admin rejected"))?;

        if !self.access.admins().any(|a| a == target) {
            return Ok(false);
        }

        self.commit(Event::AdminRemoved { admin: *target })?;
        info!(%target, "admin removed");
        Ok(true)
    }

    // =========================================================================
    // Candidates
    // =========================================================================

    pub fn add_candidate(
        &mut self,
        caller: &Address,
        name: impl Into<String>,
    ) -> Result<CandidateId, Error> {
        let name = name.into();
        self.check_add_candidate(caller, &name)
            .inspect_err(|e| debug!(%caller, %name, error = %e, "add_candidate rejected"))?;

        let id = self.next_candidate_id();
        self.commit(Event::CandidateAdded { id, name })?;
        debug!(%id, "candidate added");
        Ok(id)
    }

    fn next_candidate_id(&self) -> CandidateId {
        CandidateId(self.candidates.highest_id().get() + 1)
    }

    fn check_add_candidate(&self, caller: &Address, name: &str) -> Result<(), Error> {
        self.access.require_admin(caller)?;
        self.session.require_inactive("add")?;
        self.candidates.check_name(name)
    }

    /// Tombstone a candidate and retract its votes from the total. Returns
    /// the number of votes retracted.
    pub fn delete_candidate(&mut self, caller: &Address, id: CandidateId) -> Result<u64, Error> {
        self.check_delete_candidate(caller, id)
            .inspect_err(|e| debug!(%caller, %id, error = %e, "delete_candidate rejected"))?;

        let votes = self.candidates.get(id)?.vote_count;
        self.commit(Event::CandidateRemoved { id })?;
        debug!(%id, retracted = votes, "candidate deleted");
        Ok(votes)
    }

    fn check_delete_candidate(&self, caller: &Address, id: CandidateId) -> Result<(), Error> {
        self.access.require_admin(caller)?;
        self.session.require_inactive("delete")?;
        self.candidates.get(id).map(|_| ())
    }

    // =========================================================================
    // Voters
    // =========================================================================

    /// Mark `target` as eligible. Who may call depends on the ledger's
    /// [`RegistrationPolicy`].
    pub fn register_voter(&mut self, caller: &Address, target: Address) -> Result<(), Error> {
        self.check_register_voter(caller, &target)
            .inspect_err(|e| debug!(%caller, %target, error = %e, "register_voter rejected"))?;

        self.commit(Event::VoterRegistered { voter: target })?;
        debug!(%target, "voter registered");
        Ok(())
    }

    fn check_register_voter(&self, caller: &Address, target: &Address) -> Result<(), Error> {
        match self.voters.policy() {
            RegistrationPolicy::Disabled => return Err(Error::RegistrationDisabled),
            RegistrationPolicy::AdminManaged => self.access.require_admin(caller)?,
            RegistrationPolicy::SelfService => {
                if caller != target {
                    return Err(Error::NotSelf {
                        caller: *caller,
                        target: *target,
                    });
                }
            }
        }
        self.voters.check_register(target)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Open the voting window for `duration_minutes` from `now`. Returns
    /// the end time.
    pub fn start_voting(
        &mut self,
        caller: &Address,
        duration_minutes: u64,
        now: Timestamp,
    ) -> Result<Timestamp, Error> {
        let end_time = self
            .check_start_voting(caller, duration_minutes, now)
            .inspect_err(|e| {
                debug!(%caller, duration_minutes, error = %e, "start_voting rejected")
            })?;

        self.commit(Event::VotingStarted {
            duration_minutes,
            end_time,
        })?;
        info!(duration_minutes, end_time, "voting started");
        Ok(end_time)
    }

    fn check_start_voting(
        &self,
        caller: &Address,
        duration_minutes: u64,
        now: Timestamp,
    ) -> Result<Timestamp, Error> {
        self.access.require_admin(caller)?;
        let end_time = self.session.plan_start(now, duration_minutes)?;
        if self.candidates.live_count() == 0 {
            return Err(Error::NoCandidates);
        }
        Ok(end_time)
    }

    /// Close the window. The natural end time need not have passed.
    pub fn end_voting(&mut self, caller: &Address) -> Result<(), Error> {
        self.access
            .require_admin(caller)
            .and_then(|_| self.session.require_active())
            .inspect_err(|e| debug!(%caller, error = %e, "end_voting rejected"))?;

        self.commit(Event::VotingEnded)?;
        info!(total_votes = self.tally.total(), "voting ended");
        Ok(())
    }

    /// Cast `caller`'s single vote for `candidate` at time `now`.
    pub fn vote(
        &mut self,
        caller: &Address,
        candidate: CandidateId,
        now: Timestamp,
    ) -> Result<(), Error> {
        self.check_vote(caller, candidate, now)
            .inspect_err(|e| debug!(%caller, %candidate, now, error = %e, "vote rejected"))?;

        self.commit(Event::VoteCast {
            voter: *caller,
            candidate,
        })?;
        debug!(voter = %caller, %candidate, "vote cast");
        Ok(())
    }

    fn check_vote(
        &self,
        caller: &Address,
        candidate: CandidateId,
        now: Timestamp,
    ) -> Result<(), Error> {
        self.session.require_open(now)?;
        self.candidates.get(candidate)?;
        self.voters.check_ballot(caller)
    }

    // =========================================================================
    // Commit and replay
    // =========================================================================

    /// Seal `event` and apply it. Callers have already run every check the
    /// event needs.
    fn commit(&mut self, event: Event) -> Result<(), Error> {
        let record = self.events.seal(event)?;
        match &record.event {
            Event::AdminAdded { admin } => {
                self.access.insert(*admin);
            }
            Event::AdminRemoved { admin } => {
                self.access.remove(admin);
            }
            Event::CandidateAdded { name, .. } => {
                self.candidates.push(name.clone());
            }
            Event::CandidateRemoved { id } => {
                let votes = self.candidates.tombstone(*id)?;
                self.tally.retract(votes);
            }
            Event::VoterRegistered { voter } => self.voters.register(*voter),
            Event::VotingStarted { end_time, .. } => self.session.open(*end_time),
            Event::VotingEnded => self.session.close(),
            Event::VoteCast { voter, candidate } => {
                self.candidates.increment(*candidate)?;
                self.tally.record_vote();
                self.voters.record_ballot(*voter, *candidate);
            }
        }
        self.events.push(record);
        Ok(())
    }

    /// Check that `event` is a legal next step for this ledger. Events do
    /// not name their caller, so the owner stands in for admin actions and
    /// each voter for their own ballot and self-registration.
    fn check_replay(&self, event: &Event) -> Result<(), Error> {
        let owner = self.owner();
        match event {
            Event::AdminAdded { admin } => {
                if self.access.is_admin(admin) {
                    return Err(Error::Integrity(format!("{} added twice", admin)));
                }
            }
            Event::AdminRemoved { admin } => {
                if !self.access.admins().any(|a| a == admin) {
                    return Err(Error::Integrity(format!("{} removed but not an admin", admin)));
                }
            }
            Event::CandidateAdded { id, name } => {
                self.check_add_candidate(&owner, name)?;
                if *id != self.next_candidate_id() {
                    return Err(Error::Integrity(format!(
                        "candidate {} allocated out of order",
                        id
                    )));
                }
            }
            Event::CandidateRemoved { id } => self.check_delete_candidate(&owner, *id)?,
            Event::VoterRegistered { voter } => {
                let caller = match self.voters.policy() {
                    RegistrationPolicy::SelfService => *voter,
                    _ => owner,
                };
                self.check_register_voter(&caller, voter)?;
            }
            Event::VotingStarted {
                duration_minutes,
                end_time,
            } => {
                let start = duration_minutes
                    .checked_mul(60)
                    .and_then(|secs| end_time.checked_sub(secs))
                    .ok_or(Error::InvalidDuration(*duration_minutes))?;
                if self.check_start_voting(&owner, *duration_minutes, start)? != *end_time {
                    return Err(Error::Integrity(format!("end time {} does not follow", end_time)));
                }
            }
            Event::VotingEnded => self.session.require_active()?,
            Event::VoteCast { voter, candidate } => {
                let now = self.session.end_time().unwrap_or_default();
                self.check_vote(voter, *candidate, now)?;
            }
        }
        Ok(())
    }

    /// Rebuild a ledger from its event history, enforcing every rule each
    /// event was subject to when it was first committed.
    pub fn replay(
        owner: Address,
        policy: RegistrationPolicy,
        events: &[EventRecord],
    ) -> Result<Self, Error> {
        let mut ledger = Self::empty(owner, policy);
        for record in events {
            ledger.check_replay(&record.event).map_err(|e| {
                Error::Integrity(format!("event {} cannot be replayed: {}", record.seq, e))
            })?;
            ledger.commit(record.event.clone())?;
            if ledger.event_head() != record.digest {
                return Err(Error::Integrity(format!(
                    "event {} digest does not follow the chain",
                    record.seq
                )));
            }
        }
        Ok(ledger)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.access.is_owner(address)
    }

    pub fn is_admin(&self, address: &Address) -> bool {
        self.access.is_admin(address)
    }

    /// Appointed admins in address order (the owner is implicit).
    pub fn admins(&self) -> Vec<Address> {
        self.access.admins().copied().collect()
    }

    /// A live candidate.
    pub fn candidate(&self, id: CandidateId) -> Result<&Candidate, Error> {
        self.candidates.get(id)
    }

    /// Live candidates in id order.
    pub fn all_candidates(&self) -> Vec<&Candidate> {
        self.candidates.live().collect()
    }

    /// Count of live candidates.
    pub fn total_candidates(&self) -> usize {
        self.candidates.live_count()
    }

    /// Highest id ever allocated, tombstones included.
    pub fn highest_candidate_id(&self) -> CandidateId {
        self.candidates.highest_id()
    }

    pub fn total_votes(&self) -> u64 {
        self.tally.total()
    }

    pub fn is_voting_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn voting_end_time(&self) -> Option<Timestamp> {
        self.session.end_time()
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        self.session.phase(now)
    }

    pub fn registration_policy(&self) -> RegistrationPolicy {
        self.voters.policy()
    }

    pub fn is_voter_registered(&self, address: &Address) -> bool {
        self.voters.is_registered(address)
    }

    pub fn voter(&self, address: &Address) -> Option<&Voter> {
        self.voters.get(address)
    }

    /// Candidate `address` voted for, if any.
    pub fn voter_choice(&self, address: &Address) -> Option<CandidateId> {
        self.voters.voted_for(address)
    }

    pub fn has_voted(&self, address: &Address) -> bool {
        self.voters.get(address).is_some_and(Voter::has_voted)
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn events_since(&self, cursor: u64) -> &[EventRecord] {
        self.events.since(cursor)
    }

    /// Digest of the most recent event.
    pub fn event_head(&self) -> Hash {
        self.events.head()
    }

    pub fn verify_events(&self) -> Result<(), Error> {
        self.events.verify()
    }

    /// Digest of the entire ledger.
    pub fn state_hash(&self) -> Result<Hash, Error> {
        Hash::of_value(self)
    }

    // =========================================================================
    // Integrity and snapshots
    // =========================================================================

    /// Check every cross-component invariant.
    pub fn check_invariants(&self) -> Result<(), Error> {
        if self.session.is_active() && self.session.end_time().is_none() {
            return Err(Error::Integrity("active session has no end time".into()));
        }

        for (i, slot) in self.candidates.slots().iter().enumerate() {
            if slot.id.get() != i as u64 + 1 {
                return Err(Error::Integrity(format!("slot {} holds candidate {}", i, slot.id)));
            }
            if !slot.exists && (!slot.name.is_empty() || slot.vote_count != 0) {
                return Err(Error::Integrity(format!("tombstone {} retains data", slot.id)));
            }
        }

        let mut names = BTreeSet::new();
        for candidate in self.candidates.live() {
            if !names.insert(candidate.name.as_str()) {
                return Err(Error::Integrity(format!(
                    "duplicate live candidate name {:?}",
                    candidate.name
                )));
            }
        }

        let recount = TallyLedger::recount(&self.candidates);
        if !self.tally.is_consistent_with(&self.candidates) {
            return Err(Error::Integrity(format!(
                "total votes {} does not match candidate sum {}",
                self.tally.total(),
                recount
            )));
        }

        let highest = self.candidates.highest_id();
        let mut live_ballots = 0u64;
        for (address, voter) in self.voters.iter() {
            if voter.registered && !self.voters.policy().requires_registration() {
                return Err(Error::Integrity(format!(
                    "{} registered while registration is disabled",
                    address
                )));
            }
            if let Some(id) = voter.voted_for {
                if id.get() == 0 || id > highest {
                    return Err(Error::Integrity(format!(
                        "{} voted for unallocated candidate {}",
                        address, id
                    )));
                }
                if self.candidates.get(id).is_ok() {
                    live_ballots += 1;
                }
            }
        }
        if live_ballots != recount {
            return Err(Error::Integrity(format!(
                "{} ballots for live candidates but candidates hold {} votes",
                live_ballots, recount
            )));
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a snapshot, rejecting it unless the event chain and every
    /// invariant check out and replaying the events reproduces the stored
    /// state exactly.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let ledger: Ledger = serde_json::from_str(json)?;
        ledger.verify_events()?;
        ledger.check_invariants()?;
        let replayed = Self::replay(
            ledger.owner(),
            ledger.registration_policy(),
            ledger.events(),
        )?;
        if replayed != ledger {
            return Err(Error::Integrity("stored state does not match its event log".into()));
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    const OWNER: u8 = 1;
    const T0: Timestamp = 1_700_000_000;

    fn ledger() -> Ledger {
        Ledger::new(addr(OWNER), RegistrationPolicy::Disabled)
    }

    fn kind<T: std::fmt::Debug>(result: Result<T, Error>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn new_ledger_is_empty_and_inactive() {
        let l = ledger();
        assert_eq!(l.owner(), addr(OWNER));
        assert!(l.is_admin(&addr(OWNER)));
        assert!(!l.is_voting_active());
        assert_eq!(l.voting_end_time(), None);
        assert_eq!(l.total_candidates(), 0);
        assert_eq!(l.total_votes(), 0);
        assert!(l.events().is_empty());
        l.check_invariants().unwrap();
    }

    #[test]
    fn add_candidate_emits_event() {
        let mut l = ledger();
        let id = l.add_candidate(&addr(OWNER), "Alice").unwrap();
        assert_eq!(id, CandidateId(1));
        assert_eq!(
            l.events()[0].event,
            Event::CandidateAdded { id, name: "Alice".into() }
        );
        let c = l.candidate(id).unwrap();
        assert_eq!((c.name.as_str(), c.vote_count), ("Alice", 0));
    }

    #[test]
    fn rejected_calls_leave_ledger_untouched() {
        let mut l = ledger();
        l.add_candidate(&addr(OWNER), "Alice").unwrap();
        let before = l.clone();

        let owner = addr(OWNER);
        assert_eq!(kind(l.add_candidate(&addr(9), "Bob")), ErrorKind::Authorization);
        assert_eq!(kind(l.add_candidate(&owner, "Alice")), ErrorKind::Validation);
        assert_eq!(kind(l.delete_candidate(&owner, CandidateId(5))), ErrorKind::NotFound);
        assert_eq!(kind(l.vote(&addr(2), CandidateId(1), T0)), ErrorKind::InvalidState);
        assert_eq!(kind(l.end_voting(&owner)), ErrorKind::InvalidState);
        assert_eq!(kind(l.start_voting(&owner, 0, T0)), ErrorKind::InvalidState);
        assert_eq!(kind(l.register_voter(&owner, addr(2))), ErrorKind::InvalidState);

        assert_eq!(l, before);
    }

    #[test]
    fn vote_updates_all_three_records() {
        let mut l = ledger();
        let alice = l.add_candidate(&addr(OWNER), "Alice").unwrap();
        l.start_voting(&addr(OWNER), 10, T0).unwrap();
        l.vote(&addr(2), alice, T0 + 1).unwrap();

        assert_eq!(l.candidate(alice).unwrap().vote_count, 1);
        assert_eq!(l.total_votes(), 1);
        assert_eq!(l.voter_choice(&addr(2)), Some(alice));
        assert!(l.has_voted(&addr(2)));
        assert_eq!(
            l.events().last().unwrap().event,
            Event::VoteCast { voter: addr(2), candidate: alice }
        );
    }

    #[test]
    fn vote_for_missing_candidate_is_not_found() {
        let mut l = ledger();
        l.add_candidate(&addr(OWNER), "Alice").unwrap();
        l.start_voting(&addr(OWNER), 10, T0).unwrap();
        let err = l.vote(&addr(2), CandidateId(3), T0).unwrap_err();
        assert!(matches!(err, Error::InvalidCandidate(CandidateId(3))));
        assert!(!l.has_voted(&addr(2)));
    }

    #[test]
    fn start_requires_live_candidate() {
        let mut l = ledger();
        let id = l.add_candidate(&addr(OWNER), "Alice").unwrap();
        l.delete_candidate(&addr(OWNER), id).unwrap();
        assert!(matches!(l.start_voting(&addr(OWNER), 10, T0), Err(Error::NoCandidates)));
    }

    #[test]
    fn start_twice_is_invalid_state() {
        let mut l = ledger();
        l.add_candidate(&addr(OWNER), "Alice").unwrap();
        assert_eq!(l.start_voting(&addr(OWNER), 10, T0).unwrap(), T0 + 600);
        assert!(matches!(l.start_voting(&addr(OWNER), 10, T0), Err(Error::AlreadyActive)));
    }

    #[test]
    fn admin_changes_are_owner_only() {
        let mut l = ledger();
        assert!(l.add_admin(&addr(OWNER), addr(2)).unwrap());
        assert!(!l.add_admin(&addr(OWNER), addr(2)).unwrap());
        assert!(matches!(l.add_admin(&addr(2), addr(3)), Err(Error::NotOwner(_))));
        assert!(matches!(l.remove_admin(&addr(2), &addr(2)), Err(Error::NotOwner(_))));
        assert_eq!(l.admins(), vec![addr(2)]);

        assert!(!l.remove_admin(&addr(OWNER), &addr(7)).unwrap());
        assert!(l.remove_admin(&addr(OWNER), &addr(2)).unwrap());
        assert!(!l.is_admin(&addr(2)));
        assert_eq!(l.events().len(), 2);
    }

    #[test]
    fn owner_cannot_be_removed_as_admin() {
        let mut l = ledger();
        assert!(!l.remove_admin(&addr(OWNER), &addr(OWNER)).unwrap());
        assert!(l.is_admin(&addr(OWNER)));
    }

    #[test]
    fn admin_managed_registration() {
        let mut l = Ledger::new(addr(OWNER), RegistrationPolicy::AdminManaged);
        let alice = l.add_candidate(&addr(OWNER), "Alice").unwrap();
        assert!(matches!(l.register_voter(&addr(5), addr(5)), Err(Error::NotAdmin(_))));
        l.register_voter(&addr(OWNER), addr(5)).unwrap();
        assert!(l.is_voter_registered(&addr(5)));
        assert!(matches!(
            l.register_voter(&addr(OWNER), addr(5)),
            Err(Error::AlreadyRegistered(_))
        ));

        l.start_voting(&addr(OWNER), 10, T0).unwrap();
        assert_eq!(l.vote(&addr(6), alice, T0).unwrap_err().kind(), ErrorKind::Authorization);
        l.vote(&addr(5), alice, T0).unwrap();
    }

    #[test]
    fn self_service_registration() {
        let mut l = Ledger::new(addr(OWNER), RegistrationPolicy::SelfService);
        assert!(matches!(l.register_voter(&addr(OWNER), addr(5)), Err(Error::NotSelf { .. })));
        l.register_voter(&addr(5), addr(5)).unwrap();
        assert!(l.is_voter_registered(&addr(5)));
    }

    #[test]
    fn json_snapshot_roundtrip_preserves_hash() {
        let mut l = ledger();
        let alice = l.add_candidate(&addr(OWNER), "Alice").unwrap();
        l.start_voting(&addr(OWNER), 10, T0).unwrap();
        l.vote(&addr(2), alice, T0).unwrap();

        let restored = Ledger::from_json(&l.to_json().unwrap()).unwrap();
        assert_eq!(restored, l);
        assert_eq!(restored.state_hash().unwrap(), l.state_hash().unwrap());
    }

    #[test]
    fn from_json_rejects_inconsistent_total() {
        let mut l = ledger();
        l.add_candidate(&addr(OWNER), "Alice").unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&l.to_json().unwrap()).unwrap();
        value["tally"]["total"] = serde_json::json!(7);
        let err = Ledger::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    /// A voted ledger as an editable JSON value.
    fn voted_snapshot() -> serde_json::Value {
        let mut l = ledger();
        let alice = l.add_candidate(&addr(OWNER), "Alice").unwrap();
        l.add_candidate(&addr(OWNER), "Bob").unwrap();
        l.start_voting(&addr(OWNER), 10, T0).unwrap();
        l.vote(&addr(2), alice, T0 + 1).unwrap();
        serde_json::from_str(&l.to_json().unwrap()).unwrap()
    }

    #[test]
    fn from_json_rejects_state_that_disagrees_with_events() {
        let mut value = voted_snapshot();
        value["candidates"]["slots"][0]["vote_count"] = serde_json::json!(0);
        value["candidates"]["slots"][1]["vote_count"] = serde_json::json!(1);
        value["candidates"]["slots"][1]["name"] = serde_json::json!("Mallory");
        value["voters"]["voters"][addr(2).to_string()]["voted_for"] = serde_json::json!(2);

        let err = Ledger::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn from_json_rejects_active_session_without_end_time() {
        let mut value = voted_snapshot();
        value["session"]["end_time"] = serde_json::Value::Null;

        let err = Ledger::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);

        let stripped: Ledger = serde_json::from_str(&value.to_string()).unwrap();
        assert!(matches!(stripped.check_invariants(), Err(Error::Integrity(_))));
    }

    #[test]
    fn replay_rebuilds_restarted_election() {
        let mut l = Ledger::new(addr(OWNER), RegistrationPolicy::SelfService);
        l.add_admin(&addr(OWNER), addr(3)).unwrap();
        let alice = l.add_candidate(&addr(3), "Alice").unwrap();
        let bob = l.add_candidate(&addr(3), "Bob").unwrap();
        l.register_voter(&addr(5), addr(5)).unwrap();
        l.register_voter(&addr(6), addr(6)).unwrap();
        l.start_voting(&addr(3), 5, T0).unwrap();
        l.vote(&addr(5), bob, T0 + 300).unwrap();
        l.end_voting(&addr(3)).unwrap();
        l.delete_candidate(&addr(3), bob).unwrap();
        l.remove_admin(&addr(OWNER), &addr(3)).unwrap();
        l.start_voting(&addr(OWNER), 1, T0 + 1_000).unwrap();
        l.vote(&addr(6), alice, T0 + 1_000).unwrap();

        let replayed = Ledger::replay(l.owner(), l.registration_policy(), l.events()).unwrap();
        assert_eq!(replayed, l);
        assert_eq!(Ledger::from_json(&l.to_json().unwrap()).unwrap(), l);
    }

    #[test]
    fn replay_rejects_illegal_history() {
        let mut l = ledger();
        l.add_candidate(&addr(OWNER), "Alice").unwrap();
        l.start_voting(&addr(OWNER), 10, T0).unwrap();
        l.vote(&addr(2), CandidateId(1), T0).unwrap();

        // A second ballot from the same voter, sealed onto a valid chain.
        let mut forged = l.clone();
        let record = forged
            .events
            .seal(Event::VoteCast {
                voter: addr(2),
                candidate: CandidateId(1),
            })
            .unwrap();
        forged.events.push(record);

        let err = Ledger::replay(forged.owner(), forged.registration_policy(), forged.events())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert!(err.to_string().contains("event 3"));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert_eq!(Ledger::from_json("{").unwrap_err().kind(), ErrorKind::Codec);
    }
}

use super::{Commands, ResolvedCli, admin::AdminCommands, candidate::CandidateCommands};
use super::{session::SessionCommands, voter::VoterCommands};
use crate::config::{
    IdentityConfig, RegistrationMode, confique_app_config_layer::AppConfigLayer as PartialAppConfig,
};
use crate::{AppConfig, LedgerStore};
use confique::{Config, Layer};
use ezballot_core::{Address, CandidateId, RegistrationPolicy, Timestamp};
use std::path::Path;
use tempfile::tempdir;

const T0: Timestamp = 1_700_000_000;

fn addr(b: u8) -> Address {
    Address::from_bytes([b; 20])
}

/// Test helper that creates a ResolvedCli with test configuration
fn create_test_cli(temp_path: &Path, mode: RegistrationMode) -> ResolvedCli {
    let mut partial_config = PartialAppConfig::default_values();
    partial_config.ledger.path = Some(temp_path.join("ledger.json"));
    partial_config.election.registration = Some(mode);
    partial_config.identity.caller = Some(addr(1));

    let config = AppConfig::builder()
        .preloaded(partial_config)
        .load()
        .expect("Failed to load test config")
        .with_resolved_paths()
        .expect("Failed to resolve paths in test config");

    ResolvedCli::new(config, Some(T0))
}

/// The same CLI acting as another address at another time.
fn as_caller(cli: &ResolvedCli, caller: Address, now: Timestamp) -> ResolvedCli {
    let config = AppConfig {
        identity: IdentityConfig {
            caller: Some(caller),
        },
        ..cli.config.clone()
    };
    ResolvedCli::new(config, Some(now))
}

fn load(cli: &ResolvedCli) -> ezballot_core::Ledger {
    LedgerStore::new(&cli.config.ledger.path).load().unwrap()
}

#[test]
fn test_default_config_values() {
    let config = AppConfig::builder()
        .preloaded(PartialAppConfig::default_values())
        .load()
        .unwrap()
        .with_resolved_paths()
        .unwrap();

    assert_eq!(config.election.registration, RegistrationMode::Disabled);
    assert!(config.identity.caller.is_none());
    assert!(config.ledger.path.ends_with(".ezballot/ledger.json"));
    assert!(!config.ledger.path.to_string_lossy().contains("$HOME"));
}

#[test]
fn test_init_creates_ledger_once() {
    let temp_dir = tempdir().unwrap();
    let cli = create_test_cli(temp_dir.path(), RegistrationMode::AdminManaged);

    cli.execute(&Commands::Init { owner: None, force: false }).unwrap();
    let ledger = load(&cli);
    assert_eq!(ledger.owner(), addr(1));
    assert_eq!(ledger.registration_policy(), RegistrationPolicy::AdminManaged);

    assert!(cli.execute(&Commands::Init { owner: None, force: false }).is_err());
    cli.execute(&Commands::Init { owner: Some(addr(2)), force: true }).unwrap();
    assert_eq!(load(&cli).owner(), addr(2));
}

#[test]
fn test_full_election_through_cli() {
    let temp_dir = tempdir().unwrap();
    let owner = create_test_cli(temp_dir.path(), RegistrationMode::Disabled);

    owner.execute(&Commands::Init { owner: None, force: false }).unwrap();
    for name in ["Alice", "Bob"] {
        owner
            .execute(&Commands::Candidate {
                command: CandidateCommands::Add { name: name.to_string() },
            })
            .unwrap();
    }
    owner
        .execute(&Commands::Session { command: SessionCommands::Start { minutes: 10 } })
        .unwrap();

    let voter = as_caller(&owner, addr(5), T0 + 60);
    voter.execute(&Commands::Vote { candidate: 2 }).unwrap();
    assert!(voter.execute(&Commands::Vote { candidate: 1 }).is_err());

    let late = as_caller(&owner, addr(6), T0 + 11 * 60);
    assert!(late.execute(&Commands::Vote { candidate: 1 }).is_err());

    owner.execute(&Commands::Session { command: SessionCommands::End }).unwrap();
    owner.execute(&Commands::Results).unwrap();
    owner.execute(&Commands::Verify).unwrap();

    let ledger = load(&owner);
    assert_eq!(ledger.total_votes(), 1);
    assert_eq!(ledger.candidate(CandidateId(2)).unwrap().vote_count, 1);
    assert_eq!(ledger.voter_choice(&addr(5)), Some(CandidateId(2)));
    assert!(!ledger.is_voting_active());
}

#[test]
fn test_failed_command_leaves_file_untouched() {
    let temp_dir = tempdir().unwrap();
    let owner = create_test_cli(temp_dir.path(), RegistrationMode::Disabled);
    owner.execute(&Commands::Init { owner: None, force: false }).unwrap();
    owner
        .execute(&Commands::Candidate {
            command: CandidateCommands::Add { name: "Alice".into() },
        })
        .unwrap();

    let path = temp_dir.path().join("ledger.json");
    let before = std::fs::read(&path).unwrap();

    let stranger = as_caller(&owner, addr(9), T0);
    assert!(stranger
        .execute(&Commands::Candidate {
            command: CandidateCommands::Add { name: "Bob".into() },
        })
        .is_err());
    assert!(owner
        .execute(&Commands::Candidate {
            command: CandidateCommands::Add { name: "Alice".into() },
        })
        .is_err());

    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert!(!temp_dir.path().join("ledger.json.lock").exists());
}

#[test]
fn test_admin_and_voter_commands() {
    let temp_dir = tempdir().unwrap();
    let owner = create_test_cli(temp_dir.path(), RegistrationMode::AdminManaged);
    owner.execute(&Commands::Init { owner: None, force: false }).unwrap();

    owner
        .execute(&Commands::Admin { command: AdminCommands::Add { address: addr(3) } })
        .unwrap();
    let admin = as_caller(&owner, addr(3), T0);
    admin
        .execute(&Commands::Voter { command: VoterCommands::Register { address: addr(7) } })
        .unwrap();
    admin.execute(&Commands::Admin { command: AdminCommands::List }).unwrap();
    assert!(admin
        .execute(&Commands::Admin { command: AdminCommands::Remove { address: addr(3) } })
        .is_err());

    let ledger = load(&owner);
    assert!(ledger.is_admin(&addr(3)));
    assert!(ledger.is_voter_registered(&addr(7)));
    assert_eq!(ledger.events().len(), 2);
}

#[test]
fn test_tampered_ledger_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let owner = create_test_cli(temp_dir.path(), RegistrationMode::Disabled);
    owner.execute(&Commands::Init { owner: None, force: false }).unwrap();
    owner
        .execute(&Commands::Candidate {
            command: CandidateCommands::Add { name: "Alice".into() },
        })
        .unwrap();

    let path = temp_dir.path().join("ledger.json");
    let json = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, json.replace("\"Alice\"", "\"Mallory\"")).unwrap();

    assert!(owner.execute(&Commands::Verify).is_err());
    assert!(owner.execute(&Commands::Results).is_err());
}

#[test]
fn test_missing_caller_is_reported() {
    let temp_dir = tempdir().unwrap();
    let owner = create_test_cli(temp_dir.path(), RegistrationMode::Disabled);
    let anonymous = ResolvedCli::new(
        AppConfig {
            identity: IdentityConfig { caller: None },
            ..owner.config.clone()
        },
        Some(T0),
    );
    let err = anonymous
        .execute(&Commands::Init { owner: None, force: false })
        .unwrap_err();
    assert!(err.to_string().contains("no caller identity"));
}

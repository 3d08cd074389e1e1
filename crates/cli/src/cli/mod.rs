use crate::{AppConfig, config::expand_home_in_path, store::LedgerStore};
use admin::AdminCommands;
use candidate::CandidateCommands;
use session::SessionCommands;
use voter::VoterCommands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use confique::Config;
use ezballot_core::{Address, CandidateId, Ledger, Timestamp};
use std::path::PathBuf;
use tracing::info;

// Re-export PartialAppConfig for public usage
pub use crate::config::confique_app_config_layer::AppConfigLayer as PartialAppConfig;

mod admin;
mod candidate;
mod session;
mod voter;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "ezballot")]
#[command(about = "Run a time-boxed election from a ledger file")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "$HOME/.ezballot/config.toml")]
    config_path: PathBuf,

    /// Configuration object
    #[command(flatten)]
    config: PartialAppConfig,

    /// Override the clock, in seconds since the Unix epoch
    #[arg(long, global = true)]
    now: Option<Timestamp>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Internal helper struct that holds the resolved configuration
pub struct ResolvedCli {
    config: AppConfig,
    now: Option<Timestamp>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new ledger owned by --owner (or the caller)
    Init {
        #[arg(long)]
        owner: Option<Address>,
        /// Replace an existing ledger
        #[arg(long)]
        force: bool,
    },
    /// Admin set management (owner only)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Candidate management
    Candidate {
        #[command(subcommand)]
        command: CandidateCommands,
    },
    /// Voter registration
    Voter {
        #[command(subcommand)]
        command: VoterCommands,
    },
    /// Voting window control
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Cast the caller's vote
    Vote { candidate: u64 },
    /// Show the current tally
    Results,
    /// Print the event log
    Events {
        /// First sequence number to print
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
    /// Verify the event chain and ledger invariants
    Verify,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let log_level = if self.verbose { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(format!(
                "ezballot_cli={},ezballot_core={},warn",
                log_level, log_level
            ))
            .init();

        let command = self.command;
        let now = self.now;
        let config_path = expand_home_in_path(&self.config_path)?;

        // Load configuration using confique
        let config = AppConfig::builder()
            .preloaded(self.config)
            .env()
            .file(&config_path)
            .load()?
            .with_resolved_paths()?;

        ResolvedCli::new(config, now).execute(&command)
    }
}

impl ResolvedCli {
    pub fn new(config: AppConfig, now: Option<Timestamp>) -> Self {
        Self { config, now }
    }

    fn store(&self) -> LedgerStore {
        LedgerStore::new(&self.config.ledger.path)
    }

    fn caller(&self) -> Result<Address> {
        self.config.identity.caller.ok_or_else(|| {
            anyhow::anyhow!("no caller identity: pass --caller or set EZBALLOT_CALLER")
        })
    }

    /// The environment clock, unless overridden with --now.
    fn now(&self) -> Timestamp {
        self.now
            .unwrap_or_else(|| u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0))
    }

    fn execute(&self, command: &Commands) -> Result<()> {
        match command {
            Commands::Init { owner, force } => self.init(*owner, *force),
            Commands::Admin { command } => {
                admin::AdminHandler::new(self.store()).handle(command, self.caller())
            }
            Commands::Candidate { command } => {
                candidate::CandidateHandler::new(self.store()).handle(command, self.caller())
            }
            Commands::Voter { command } => {
                voter::VoterHandler::new(self.store()).handle(command, self.caller())
            }
            Commands::Session { command } => {
                session::SessionHandler::new(self.store(), self.now())
                    .handle(command, self.caller())
            }
            Commands::Vote { candidate } => self.vote(CandidateId(*candidate)),
            Commands::Results => self.results(),
            Commands::Events { since } => self.events(*since),
            Commands::Verify => self.verify(),
        }
    }

    fn init(&self, owner: Option<Address>, force: bool) -> Result<()> {
        let owner = match owner {
            Some(owner) => owner,
            None => self.caller()?,
        };
        let ledger = Ledger::new(owner, self.config.election.registration.into());
        let store = self.store();
        store.create(&ledger, force)?;
        info!(path = %store.path().display(), %owner, "ledger initialized");
        println!("Ledger created at {} (owner {})", store.path().display(), owner);
        Ok(())
    }

    fn vote(&self, candidate: CandidateId) -> Result<()> {
        let caller = self.caller()?;
        let now = self.now();
        self.store()
            .update(|ledger| ledger.vote(&caller, candidate, now))?;
        println!("Vote cast for candidate {}", candidate);
        Ok(())
    }

    fn results(&self) -> Result<()> {
        let ledger = self.store().load()?;
        for c in ledger.all_candidates() {
            println!("{:>4}  {:<24} {}", c.id, c.name, c.vote_count);
        }
        println!("Total votes: {}", ledger.total_votes());
        Ok(())
    }

    fn events(&self, since: u64) -> Result<()> {
        let ledger = self.store().load()?;
        for record in ledger.events_since(since) {
            println!(
                "{:>6}  {}  {}",
                record.seq,
                &record.digest.to_hex()[..16],
                serde_json::to_string(&record.event)?
            );
        }
        Ok(())
    }

    fn verify(&self) -> Result<()> {
        // load() already replays the events and checks the stored state
        let ledger = self.store().load()?;
        println!("Events: {} (head {})", ledger.events().len(), ledger.event_head());
        println!("State hash: {}", ledger.state_hash()?);
        Ok(())
    }
}

/// Render a timestamp for humans.
fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

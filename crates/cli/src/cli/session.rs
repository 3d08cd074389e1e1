use anyhow::Result;
use clap::Subcommand;
use ezballot_core::{Address, Phase, Timestamp};

use super::format_timestamp;
use crate::store::LedgerStore;

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Open voting for the given number of minutes
    Start { minutes: u64 },
    /// Close voting now
    End,
    /// Show whether voting is open
    Status,
}

pub struct SessionHandler {
    store: LedgerStore,
    now: Timestamp,
}

impl SessionHandler {
    pub fn new(store: LedgerStore, now: Timestamp) -> Self {
        Self { store, now }
    }

    pub fn handle(&self, command: &SessionCommands, caller: Result<Address>) -> Result<()> {
        match command {
            SessionCommands::Start { minutes } => {
                let caller = caller?;
                let end_time = self
                    .store
                    .update(|l| l.start_voting(&caller, *minutes, self.now))?;
                println!(
                    "Voting started for {} minutes, ends at {}",
                    minutes,
                    format_timestamp(end_time)
                );
            }
            SessionCommands::End => {
                let caller = caller?;
                let total = self.store.update(|l| {
                    l.end_voting(&caller)?;
                    Ok(l.total_votes())
                })?;
                println!("Voting ended with {} votes cast", total);
            }
            SessionCommands::Status => {
                let ledger = self.store.load()?;
                let phase = match ledger.phase(self.now) {
                    Phase::Inactive => "inactive",
                    Phase::Open => "open",
                    Phase::Expired => "expired (awaiting end)",
                };
                println!("status:   {}", phase);
                match ledger.voting_end_time() {
                    Some(end) => println!("end time: {}", format_timestamp(end)),
                    None => println!("end time: -"),
                }
            }
        }
        Ok(())
    }
}

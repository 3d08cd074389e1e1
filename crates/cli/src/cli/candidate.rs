use anyhow::Result;
use clap::Subcommand;
use ezballot_core::{Address, CandidateId};

use crate::store::LedgerStore;

#[derive(Subcommand)]
pub enum CandidateCommands {
    /// Register a candidate (voting must be inactive)
    Add { name: String },
    /// Delete a candidate and retract its votes (voting must be inactive)
    Delete { id: u64 },
    /// Show one candidate
    Show { id: u64 },
    /// List live candidates
    List,
}

pub struct CandidateHandler {
    store: LedgerStore,
}

impl CandidateHandler {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub fn handle(&self, command: &CandidateCommands, caller: Result<Address>) -> Result<()> {
        match command {
            CandidateCommands::Add { name } => {
                let caller = caller?;
                let id = self.store.update(|l| l.add_candidate(&caller, name.as_str()))?;
                println!("Candidate \"{}\" added with id {}", name, id);
            }
            CandidateCommands::Delete { id } => {
                let caller = caller?;
                let retracted = self
                    .store
                    .update(|l| l.delete_candidate(&caller, CandidateId(*id)))?;
                println!("Candidate {} deleted ({} votes retracted)", id, retracted);
            }
            CandidateCommands::Show { id } => {
                let ledger = self.store.load()?;
                let c = ledger.candidate(CandidateId(*id))?;
                println!("id:    {}\nname:  {}\nvotes: {}", c.id, c.name, c.vote_count);
            }
            CandidateCommands::List => {
                let ledger = self.store.load()?;
                for c in ledger.all_candidates() {
                    println!("{:>4}  {}", c.id, c.name);
                }
                println!(
                    "{} live candidates (highest id {})",
                    ledger.total_candidates(),
                    ledger.highest_candidate_id()
                );
            }
        }
        Ok(())
    }
}

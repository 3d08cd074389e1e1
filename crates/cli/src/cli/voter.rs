use anyhow::Result;
use clap::Subcommand;
use ezballot_core::Address;

use crate::store::LedgerStore;

#[derive(Subcommand)]
pub enum VoterCommands {
    /// Register an address as an eligible voter
    Register { address: Address },
    /// Show registration and ballot status
    Status { address: Address },
}

pub struct VoterHandler {
    store: LedgerStore,
}

impl VoterHandler {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub fn handle(&self, command: &VoterCommands, caller: Result<Address>) -> Result<()> {
        match command {
            VoterCommands::Register { address } => {
                let caller = caller?;
                self.store.update(|l| l.register_voter(&caller, *address))?;
                println!("Voter registered: {}", address);
            }
            VoterCommands::Status { address } => {
                let ledger = self.store.load()?;
                println!("registered: {}", ledger.is_voter_registered(address));
                match ledger.voter_choice(address) {
                    Some(id) => println!("voted for:  {}", id),
                    None => println!("voted for:  -"),
                }
            }
        }
        Ok(())
    }
}

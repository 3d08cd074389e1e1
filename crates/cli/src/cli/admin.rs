use anyhow::Result;
use clap::Subcommand;
use ezballot_core::Address;

use crate::store::LedgerStore;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Grant admin rights to an address
    Add { address: Address },
    /// Revoke admin rights from an address
    Remove { address: Address },
    /// List the owner and appointed admins
    List,
}

pub struct AdminHandler {
    store: LedgerStore,
}

impl AdminHandler {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub fn handle(&self, command: &AdminCommands, caller: Result<Address>) -> Result<()> {
        match command {
            AdminCommands::Add { address } => {
                let caller = caller?;
                if self.store.update(|l| l.add_admin(&caller, *address))? {
                    println!("Added admin: {}", address);
                } else {
                    println!("{} is already an admin", address);
                }
                Ok(())
            }
            AdminCommands::Remove { address } => {
                let caller = caller?;
                if self.store.update(|l| l.remove_admin(&caller, address))? {
                    println!("Removed admin: {}", address);
                } else {
                    println!("{} was not an admin", address);
                }
                Ok(())
            }
            AdminCommands::List => {
                let ledger = self.store.load()?;
                println!("owner  {}", ledger.owner());
                for admin in ledger.admins() {
                    println!("admin  {}", admin);
                }
                Ok(())
            }
        }
    }
}

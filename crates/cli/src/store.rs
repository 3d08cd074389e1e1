//! The ledger file: one JSON snapshot, replaced atomically on every commit.
//!
//! Writers hold `<ledger>.lock` for the whole load-apply-save cycle, so two
//! commands never commit from the same starting state.

use anyhow::{Context, Result, bail};
use ezballot_core::Ledger;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub struct LedgerStore {
    path: PathBuf,
}

/// Exclusive write access to a ledger file. Released on drop.
struct LedgerLock {
    path: PathBuf,
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "failed to release ledger lock");
        }
    }
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn lock_path(&self) -> PathBuf {
        let mut lock = self.path.as_os_str().to_owned();
        lock.push(".lock");
        PathBuf::from(lock)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn lock(&self) -> Result<LedgerLock> {
        let path = self.lock_path();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(LedgerLock { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => bail!(
                "ledger {} is busy: another command holds {} (delete it if no command is running)",
                self.path.display(),
                path.display()
            ),
            Err(e) => Err(e)
                .with_context(|| format!("failed to create lock file {}", path.display())),
        }
    }

    /// Write a fresh ledger. Refuses to overwrite unless `force` is set.
    pub fn create(&self, ledger: &Ledger, force: bool) -> Result<()> {
        std::fs::create_dir_all(self.dir())?;
        let _lock = self.lock()?;
        if self.exists() && !force {
            bail!(
                "ledger already exists at {} (use --force to replace it)",
                self.path.display()
            );
        }
        self.save(ledger)
    }

    /// Read and verify the ledger.
    pub fn load(&self) -> Result<Ledger> {
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read ledger at {}", self.path.display()))?;
        let ledger = Ledger::from_json(&json)
            .with_context(|| format!("failed to load ledger at {}", self.path.display()))?;
        Ok(ledger)
    }

    /// Replace the file through a temp file in the same directory. Callers
    /// must hold the lock.
    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.dir())
            .with_context(|| format!("failed to stage ledger next to {}", self.path.display()))?;
        tmp.write_all(ledger.to_json()?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        debug!(path = %self.path.display(), events = ledger.events().len(), "ledger saved");
        Ok(())
    }

    /// Load, apply one operation, and save only if it succeeded. Fails fast
    /// if another command is mid-update.
    pub fn update<T>(
        &self,
        op: impl FnOnce(&mut Ledger) -> Result<T, ezballot_core::Error>,
    ) -> Result<T> {
        let _lock = self.lock()?;
        let mut ledger = self.load()?;
        let out = op(&mut ledger)?;
        self.save(&ledger)?;
        Ok(out)
    }
}

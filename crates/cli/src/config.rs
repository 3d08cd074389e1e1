use anyhow::Result;
use clap::{Args, ValueEnum};
use confique::Config;
use ezballot_core::{Address, RegistrationPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Expand `$HOME` in a path.
pub fn expand_home_in_path(path: &Path) -> Result<PathBuf> {
    let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in path"))?;

    if path_str.contains("$HOME") {
        let expanded = path_str.replace("$HOME", home_dir.to_str().unwrap_or("."));
        Ok(PathBuf::from(expanded))
    } else {
        Ok(path.to_path_buf())
    }
}

#[derive(Config, Clone, Serialize, Deserialize)]
#[config(layer_attr(derive(Args, Serialize, Clone)))]
pub struct AppConfig {
    #[config(nested, layer_attr(command(flatten)))]
    pub ledger: LedgerConfig,

    #[config(nested, layer_attr(command(flatten)))]
    pub election: ElectionConfig,

    #[config(nested, layer_attr(command(flatten)))]
    pub identity: IdentityConfig,
}

#[derive(Clone, Config, Deserialize, Serialize)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct LedgerConfig {
    /// Path of the JSON ledger file
    #[config(
        default = "$HOME/.ezballot/ledger.json",
        env = "EZBALLOT_LEDGER",
        layer_attr(arg(long = "ledger"))
    )]
    pub path: PathBuf,
}

#[derive(Clone, Config, Deserialize, Serialize)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct ElectionConfig {
    /// Voter registration policy for newly created ledgers
    #[config(default = "disabled", layer_attr(arg(long, value_enum)))]
    pub registration: RegistrationMode,
}

#[derive(Clone, Config, Deserialize, Serialize)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct IdentityConfig {
    /// Address the command is executed as
    #[config(env = "EZBALLOT_CALLER", layer_attr(arg(long)))]
    pub caller: Option<Address>,
}

/// Config-file spelling of [`RegistrationPolicy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationMode {
    #[default]
    Disabled,
    AdminManaged,
    SelfService,
}

impl From<RegistrationMode> for RegistrationPolicy {
    fn from(mode: RegistrationMode) -> Self {
        match mode {
            RegistrationMode::Disabled => RegistrationPolicy::Disabled,
            RegistrationMode::AdminManaged => RegistrationPolicy::AdminManaged,
            RegistrationMode::SelfService => RegistrationPolicy::SelfService,
        }
    }
}

impl AppConfig {
    /// Resolve `$HOME` placeholders. Call once after loading.
    pub fn with_resolved_paths(mut self) -> Result<Self> {
        self.ledger.path = expand_home_in_path(&self.ledger.path)?;
        Ok(self)
    }
}

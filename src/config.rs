use color_eyre::{Result, eyre::WrapErr};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing_subscriber::EnvFilter;

/// Env var holding a path to a JSON network profile that replaces the
/// compiled-in Monad testnet defaults.
const NETWORK_PROFILE_VAR: &str = "BALANCE_TUI_NETWORK";
/// Env var overriding just the RPC endpoint of the active profile.
const RPC_URL_VAR: &str = "BALANCE_TUI_RPC_URL";
/// Env var naming a file to receive tracing output. Unset means no logging;
/// the terminal belongs to the UI.
const LOG_FILE_VAR: &str = "BALANCE_TUI_LOG";

/// The one network this process talks to, fixed for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    18
}

impl NetworkConfig {
    pub fn default_profile() -> Self {
        Self {
            name: "Monad Testnet".into(),
            chain_id: 10_143,
            rpc_url: "https://testnet-rpc.monad.xyz".into(),
            symbol: "MON".into(),
            decimals: 18,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read network profile {}", path.display()))?;
        serde_json::from_str(&raw)
            .wrap_err_with(|| format!("failed to parse network profile {}", path.display()))
    }

    /// Resolves the active profile: JSON file if configured, otherwise the
    /// Monad testnet defaults, with the RPC endpoint overridable on its own.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(NETWORK_PROFILE_VAR) {
            Some(path) => Self::from_file(path)?,
            None => Self::default_profile(),
        };
        if let Ok(url) = std::env::var(RPC_URL_VAR) {
            if !url.trim().is_empty() {
                config.rpc_url = url;
            }
        }
        Ok(config)
    }

    pub fn descriptor(&self) -> String {
        format!("{} (chain {})", self.name, self.chain_id)
    }
}

/// Sends tracing output to the file named by `BALANCE_TUI_LOG`, filtered by
/// `RUST_LOG`. A no-op when the variable is unset.
pub fn init_tracing() -> Result<()> {
    let Some(path) = std::env::var_os(LOG_FILE_VAR) else {
        return Ok(());
    };
    let file = fs::File::create(&path)
        .wrap_err_with(|| format!("failed to open log file {}", Path::new(&path).display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

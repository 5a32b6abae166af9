use alloy::primitives::Address;
use eyre::WrapErr;
use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::constants::{
    API_BASE_URL, CHAIN_ID, CLAIM_DELAY_SECS, EXPLORER_URL, FAUCET_CONTRACT_ADDRESS, REFERER,
    RPC_URL, RUN_INTERVAL_SECS,
};

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,
    pub faucet_contract_address: Address,
    pub api_base_url: String,
    pub referer: String,
    pub claim_delay_secs: u64,
    pub run_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: RPC_URL.to_string(),
            chain_id: CHAIN_ID,
            explorer_url: EXPLORER_URL.to_string(),
            faucet_contract_address: FAUCET_CONTRACT_ADDRESS,
            api_base_url: API_BASE_URL.to_string(),
            referer: REFERER.to_string(),
            claim_delay_secs: CLAIM_DELAY_SECS,
            run_interval_secs: RUN_INTERVAL_SECS,
        }
    }
}

impl Config {
    async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        Ok(toml::from_str(&cfg_str)?)
    }

    /// Reads the config file if it exists, falling back to the built-in defaults otherwise.
    /// A file that exists but does not parse is an error.
    pub async fn read_or_default(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::read_from_file(path)
            .await
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))
    }

    pub fn claim_delay(&self) -> Duration {
        Duration::from_secs(self.claim_delay_secs)
    }

    pub fn run_interval(&self) -> Duration {
        Duration::from_secs(self.run_interval_secs)
    }
}

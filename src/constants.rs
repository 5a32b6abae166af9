use alloy::primitives::{address, Address};
use alloy_chains::NamedChain;

// NETWORK
pub const RPC_URL: &str = "https://sepolia.drpc.org/";
pub const CHAIN_ID: u64 = NamedChain::Sepolia as u64;
pub const EXPLORER_URL: &str = "https://sepolia.etherscan.io";

// 0x4e71d92d - claim()
pub const FAUCET_CONTRACT_ADDRESS: Address = address!("57c5dc670eb6f571bdd8fc1cf178c46c9a917a74");

// API
pub const API_BASE_URL: &str = "https://api.deperp.xyz/api/v1";
pub const REFERER: &str = "https://testnet.novastro.xyz/";
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const PROPERTIES_PAGE_SIZE: u32 = 50;
pub const DEFAULT_PURCHASE_AMOUNT: &str = "100.00";

// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const LOG_DIRECTORY: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "novastro-daily.log";

// ENV
pub const PRIVATE_KEY_ENV_PREFIX: &str = "PRIVATE_KEY_";

// TIMING
pub const CLAIM_DELAY_SECS: u64 = 20;
pub const RUN_INTERVAL_SECS: u64 = 24 * 60 * 60;

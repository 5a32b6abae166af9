use std::{path::PathBuf, sync::Arc};

use auth::AuthClient;
use chain::ChainClient;
use clap::Parser;
use config::Config;
use http::ApiClient;
use logger::init_default_logger;
use properties::PropertyClient;
use runner::TaskRunner;

mod auth;
mod chain;
mod config;
mod constants;
mod http;
mod logger;
mod prompt;
mod properties;
mod runner;
mod scheduler;
mod types;
mod wallets;

/// Daily faucet claims and property purchases for every `PRIVATE_KEY_<n>` wallet.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// TOML file overriding the built-in endpoints and timings.
    #[arg(long, default_value = constants::CONFIG_FILE_PATH)]
    config: PathBuf,

    /// Faucet claims per wallet. Asked interactively when omitted.
    #[arg(long, env = "NUM_CLAIMS", allow_hyphen_values = true)]
    claims: Option<String>,

    /// Properties to buy per wallet. Asked interactively when omitted.
    #[arg(long, env = "NUM_TO_BUY", allow_hyphen_values = true)]
    purchases: Option<String>,

    /// Run a single pass over all wallets and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _guard = init_default_logger();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::read_or_default(&cli.config).await?;

    let wallets = wallets::read_private_keys()?;
    tracing::info!("Found {} wallet(s).", wallets.len());

    let run_config = prompt::read_run_config(cli.claims, cli.purchases, config.claim_delay()).await?;
    tracing::info!(
        "Bot configured for: {} faucet claim(s) & {} property purchase(s) per wallet.",
        run_config.num_claims,
        run_config.num_to_buy
    );

    let chain = Arc::new(ChainClient::connect(&config)?);
    let api = ApiClient::new(&config.api_base_url, &config.referer)?;
    let runner = TaskRunner::new(
        chain.clone(),
        AuthClient::new(api.clone()),
        PropertyClient::new(api, chain),
        run_config,
    );

    if cli.once {
        runner.run_tasks(&wallets).await;
        return Ok(());
    }

    scheduler::run_daily(&runner, &wallets, config.run_interval()).await;

    Ok(())
}

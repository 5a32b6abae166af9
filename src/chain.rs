use alloy::{
    eips::BlockId,
    network::{Ethereum, NetworkWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{Provider, RootProvider},
    rpc::{client::ClientBuilder, types::TransactionRequest},
    sol,
    sol_types::SolCall,
    transports::{http::Http, layers::RetryBackoffLayer, BoxTransport, Transport},
};
use async_trait::async_trait;
use eyre::WrapErr;

use FaucetContract::claimCall;

use crate::{config::Config, types::PayloadStep, wallets::Wallet};

sol! {
    contract FaucetContract {
        function claim() external;
    }
}

/// The two on-chain operations the runner needs.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Never errors: failures are logged and reported as `false`.
    async fn claim_faucet(&self, wallet: &Wallet, index: u32, total: u32) -> bool;

    /// Sends one purchase intent step and waits for its receipt. A revert is an error.
    async fn send_purchase_step(&self, wallet: &Wallet, step: &PayloadStep) -> eyre::Result<TxHash>;
}

pub fn claim_calldata() -> Bytes {
    claimCall {}.abi_encode().into()
}

/// Nonces count transactions still in the mempool.
pub fn nonce_block() -> BlockId {
    BlockId::pending()
}

/// Signs and broadcasts an EIP-1559 transaction, then waits for one confirmation.
/// Returns the transaction hash and whether the receipt reports success.
pub async fn send_transaction<P, T, W>(
    provider: &P,
    wallet: &W,
    chain_id: u64,
    to: Address,
    input: Option<Bytes>,
    value: U256,
) -> eyre::Result<(TxHash, bool)>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
    W: NetworkWallet<Ethereum>,
{
    let eip1559_fees = provider.estimate_eip1559_fees(None).await?;
    let from = wallet.default_signer_address();

    let nonce = provider
        .get_transaction_count(from)
        .block_id(nonce_block())
        .await?;

    let mut tx_request = TransactionRequest::default()
        .with_max_fee_per_gas(eip1559_fees.max_fee_per_gas)
        .with_max_priority_fee_per_gas(eip1559_fees.max_priority_fee_per_gas)
        .with_to(to)
        .with_value(value)
        .with_nonce(nonce)
        .with_chain_id(chain_id)
        .with_from(from);

    if let Some(data) = input {
        tx_request.set_input(data);
    }

    let gas_limit = provider.estimate_gas(&tx_request).await?;
    tx_request.set_gas_limit(gas_limit);

    let signed_transaction = tx_request.build(wallet).await?;
    let pending_tx = provider.send_tx_envelope(signed_transaction).await?;
    tracing::info!("Waiting for transaction confirmation: {}", pending_tx.tx_hash());

    let receipt = pending_tx.get_receipt().await?;

    Ok((receipt.transaction_hash, receipt.status()))
}

pub struct ChainClient {
    provider: RootProvider<BoxTransport>,
    chain_id: u64,
    faucet_contract_address: Address,
    explorer_url: String,
}

impl ChainClient {
    /// Builds the HTTP provider. No request is made until the first transaction.
    pub fn connect(config: &Config) -> eyre::Result<Self> {
        let rpc_url = config
            .rpc_url
            .parse::<reqwest::Url>()
            .wrap_err_with(|| format!("Invalid RPC URL {}", config.rpc_url))?;

        // Only rate-limited responses are retried here.
        let retry_layer = RetryBackoffLayer::new(10, 2, 500);
        let client = ClientBuilder::default()
            .layer(retry_layer)
            .transport(Http::new(rpc_url), false)
            .boxed();

        Ok(Self {
            provider: RootProvider::new(client),
            chain_id: config.chain_id,
            faucet_contract_address: config.faucet_contract_address,
            explorer_url: config.explorer_url.trim_end_matches('/').to_string(),
        })
    }

    fn tx_url(&self, hash: &TxHash) -> String {
        format!("{}/tx/{hash}", self.explorer_url)
    }

    async fn send_and_confirm(
        &self,
        wallet: &Wallet,
        to: Address,
        input: Option<Bytes>,
        value: U256,
    ) -> eyre::Result<TxHash> {
        let (hash, status) = send_transaction(
            &self.provider,
            wallet.network_wallet(),
            self.chain_id,
            to,
            input,
            value,
        )
        .await?;

        let url = self.tx_url(&hash);
        if !status {
            eyre::bail!("Transaction reverted: {url}");
        }

        tracing::info!("Transaction successful: {url}");
        Ok(hash)
    }
}

#[async_trait]
impl Chain for ChainClient {
    async fn claim_faucet(&self, wallet: &Wallet, index: u32, total: u32) -> bool {
        let address = wallet.address();
        tracing::info!("[{index}/{total}] Preparing on-chain faucet claim for wallet {address}");
        tracing::info!(
            "Sending claim transaction to contract: {}",
            self.faucet_contract_address
        );

        match self
            .send_and_confirm(
                wallet,
                self.faucet_contract_address,
                Some(claim_calldata()),
                U256::ZERO,
            )
            .await
        {
            Ok(hash) => {
                tracing::info!("[{index}/{total}] Faucet claim transaction confirmed! Hash: {hash}");
                true
            }
            Err(e) => {
                tracing::error!("[{index}/{total}] On-chain faucet claim failed for {address}: {e}");
                false
            }
        }
    }

    async fn send_purchase_step(&self, wallet: &Wallet, step: &PayloadStep) -> eyre::Result<TxHash> {
        let value = step.value()?;
        self.send_and_confirm(wallet, step.to, step.data.clone(), value)
            .await
            .wrap_err_with(|| format!("{} transaction to {} failed", step.kind, step.to))
    }
}

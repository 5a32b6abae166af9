use std::{sync::Arc, time::Duration};

use rand::{seq::SliceRandom, thread_rng, Rng};

use crate::{
    auth::Authenticator,
    chain::Chain,
    properties::PropertyApi,
    types::{Property, SessionToken},
    wallets::Wallet,
};

/// Per-wallet work, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub num_claims: u32,
    pub num_to_buy: u32,
    pub claim_delay: Duration,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub claims_attempted: u32,
    pub claims_succeeded: u32,
    pub purchases_succeeded: u32,
    pub login_failures: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOutcome {
    pub attempted: u32,
    pub bought: u32,
}

pub fn shuffle_candidates(candidates: &mut [Property], rng: &mut impl Rng) {
    candidates.shuffle(rng);
}

pub struct TaskRunner<C, A, P> {
    chain: Arc<C>,
    auth: A,
    properties: P,
    config: RunConfig,
}

impl<C, A, P> TaskRunner<C, A, P>
where
    C: Chain,
    A: Authenticator,
    P: PropertyApi,
{
    pub fn new(chain: Arc<C>, auth: A, properties: P, config: RunConfig) -> Self {
        Self {
            chain,
            auth,
            properties,
            config,
        }
    }

    /// One full pass over every wallet, strictly one after another.
    pub async fn run_tasks(&self, wallets: &[Wallet]) -> RunSummary {
        tracing::info!(
            "Starting Daily Tasks at {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let mut summary = RunSummary::default();

        for (index, wallet) in wallets.iter().enumerate() {
            tracing::info!(
                "--- Processing Wallet {}/{}: {} ---",
                index + 1,
                wallets.len(),
                wallet.address()
            );

            if self.config.num_claims > 0 {
                summary.claims_attempted += self.config.num_claims;
                summary.claims_succeeded += self.claim_faucet_for(wallet).await;
            }

            if self.config.num_to_buy > 0 {
                match self.auth.login(wallet).await {
                    Ok(token) => {
                        summary.purchases_succeeded += self.buy_properties(wallet, &token).await;
                    }
                    Err(e) => {
                        summary.login_failures += 1;
                        tracing::error!(
                            "Skipping property purchase for wallet {} due to login failure: {e}",
                            wallet.address()
                        );
                    }
                }
            }
        }

        tracing::info!(
            "All Daily Tasks Completed for all wallets. Claims: {}/{}, purchases: {}, login failures: {}",
            summary.claims_succeeded,
            summary.claims_attempted,
            summary.purchases_succeeded,
            summary.login_failures
        );

        summary
    }

    /// Returns how many claims confirmed. A failed claim never stops the remaining ones.
    async fn claim_faucet_for(&self, wallet: &Wallet) -> u32 {
        let total = self.config.num_claims;
        let address = wallet.address();
        tracing::info!("Starting faucet claims for wallet {address}");

        let mut succeeded = 0;
        for index in 1..=total {
            if self.chain.claim_faucet(wallet, index, total).await {
                succeeded += 1;
            }

            if index < total {
                tracing::info!(
                    "Waiting {} seconds before next claim...",
                    self.config.claim_delay.as_secs()
                );
                tokio::time::sleep(self.config.claim_delay).await;
            }
        }

        tracing::info!("Finished {total} faucet claims for wallet {address} ({succeeded} confirmed).");
        succeeded
    }

    async fn buy_properties(&self, wallet: &Wallet, token: &SessionToken) -> u32 {
        let target = self.config.num_to_buy;
        let address = wallet.address();
        tracing::info!("Starting automatic purchase of {target} properties for wallet {address}");

        let mut candidates = self.properties.list_properties(token).await;
        if candidates.is_empty() {
            tracing::warn!("No properties available for purchase.");
            return 0;
        }

        shuffle_candidates(&mut candidates, &mut thread_rng());

        let outcome = self
            .purchase_until_target(wallet, token, &candidates, target)
            .await;

        if outcome.bought < target {
            tracing::error!(
                "Could only purchase {} out of {target} requested properties for wallet {address} ({} attempted).",
                outcome.bought,
                outcome.attempted
            );
        } else {
            tracing::info!("Daily purchase goal of {target} properties met for wallet {address}.");
        }

        outcome.bought
    }

    /// Walks the candidates in order, one attempt each, until `target` purchases succeed or the
    /// list runs out.
    pub async fn purchase_until_target(
        &self,
        wallet: &Wallet,
        token: &SessionToken,
        candidates: &[Property],
        target: u32,
    ) -> PurchaseOutcome {
        let mut outcome = PurchaseOutcome::default();

        for property in candidates {
            if outcome.bought >= target {
                break;
            }

            tracing::info!(
                "[{}/{target}] Attempting to buy property: {}",
                outcome.bought + 1,
                property.title
            );

            outcome.attempted += 1;
            let amount = property.purchase_amount();

            match self
                .properties
                .purchase(wallet, token, property, &amount)
                .await
            {
                Ok(()) => {
                    tracing::info!("Successfully purchased: {}", property.title);
                    outcome.bought += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to purchase {}: {e:#}", property.title);
                    tracing::info!("Trying next property...");
                }
            }
        }

        outcome
    }
}

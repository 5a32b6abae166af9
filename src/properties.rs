use std::sync::Arc;

use alloy::primitives::TxHash;
use async_trait::async_trait;

use crate::{
    chain::Chain,
    constants::PROPERTIES_PAGE_SIZE,
    http::{ApiClient, ApiError, RequestParams},
    types::{
        PrepareRequest, PropertiesPage, Property, PurchaseIntent, SessionToken, SubmitRequest,
    },
    wallets::Wallet,
};

#[async_trait]
pub trait PropertyApi: Send + Sync {
    /// First page only. Errors are logged and produce an empty list.
    async fn list_properties(&self, token: &SessionToken) -> Vec<Property>;

    /// prepare → every payload transaction confirmed on-chain → submit.
    async fn purchase(
        &self,
        wallet: &Wallet,
        token: &SessionToken,
        property: &Property,
        amount: &str,
    ) -> eyre::Result<()>;
}

pub struct PropertyClient<C> {
    api: ApiClient,
    chain: Arc<C>,
}

impl<C: Chain> PropertyClient<C> {
    pub fn new(api: ApiClient, chain: Arc<C>) -> Self {
        Self { api, chain }
    }

    async fn prepare(
        &self,
        token: &SessionToken,
        property: &Property,
        amount: &str,
    ) -> Result<PurchaseIntent, ApiError> {
        let path = format!("/properties/{}/purchase/prepare", property.id());
        let body = PrepareRequest {
            purchase_amount: amount,
        };

        self.api
            .fetch_data(&RequestParams::post(&path, &body).with_bearer(token))
            .await
    }

    /// Sends every step in order and returns the hash of the last one.
    async fn execute_intent(
        &self,
        wallet: &Wallet,
        property: &Property,
        intent: &PurchaseIntent,
    ) -> eyre::Result<TxHash> {
        let mut last_hash = None;

        for step in &intent.payload {
            tracing::info!(
                "Sending on-chain transaction type: {} for property {}",
                step.kind,
                property.title
            );
            let hash = self.chain.send_purchase_step(wallet, step).await?;
            tracing::info!("Transaction for {} confirmed! Hash: {hash}", step.kind);
            last_hash = Some(hash);
        }

        last_hash.ok_or_else(|| eyre::eyre!("Purchase intent has no transactions to send"))
    }

    async fn submit(
        &self,
        token: &SessionToken,
        property: &Property,
        intent: &PurchaseIntent,
        transaction_hash: TxHash,
    ) -> Result<(), ApiError> {
        let path = format!("/properties/{}/purchase/submit", property.id());
        let body = SubmitRequest {
            transaction_event_id: &intent.transaction_event_id,
            transaction_hash: transaction_hash.to_string(),
        };

        let response = self
            .api
            .send_http_request(&RequestParams::post(&path, &body).with_bearer(token))
            .await?;

        if !response.success() {
            return Err(ApiError::Rejected(response.into_body().to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl<C: Chain> PropertyApi for PropertyClient<C> {
    async fn list_properties(&self, token: &SessionToken) -> Vec<Property> {
        tracing::info!("Fetching properties list...");

        let query = [
            ("page", "1".to_string()),
            ("limit", PROPERTIES_PAGE_SIZE.to_string()),
        ];
        let request = RequestParams::get("/properties")
            .with_query(&query)
            .with_bearer(token);

        match self.api.fetch_data::<PropertiesPage>(&request).await {
            Ok(page) => {
                tracing::info!("Properties list fetched successfully.");
                page.properties
            }
            Err(e) => {
                tracing::error!("Failed to get properties list: {e}");
                Vec::new()
            }
        }
    }

    async fn purchase(
        &self,
        wallet: &Wallet,
        token: &SessionToken,
        property: &Property,
        amount: &str,
    ) -> eyre::Result<()> {
        tracing::info!(
            "Preparing purchase for {amount} USD for property ID: {}",
            property.id()
        );
        let intent = self.prepare(token, property, amount).await?;

        // All steps must confirm before submit; a partial intent is left to expire server side.
        let last_hash = self.execute_intent(wallet, property, &intent).await?;

        tracing::info!("Submitting transaction hash to the API...");
        self.submit(token, property, &intent, last_hash).await?;

        Ok(())
    }
}

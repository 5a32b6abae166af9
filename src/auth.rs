use alloy::hex;
use async_trait::async_trait;
use thiserror::Error;

use crate::{
    http::{ApiClient, ApiError, RequestParams},
    types::{LoginData, LoginRequest, NonceData, SessionToken},
    wallets::Wallet,
};

/// Which step of the nonce → sign → login sequence failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("could not retrieve nonce: {0}")]
    Nonce(#[source] ApiError),
    #[error("could not sign nonce message: {0}")]
    Signing(#[from] alloy::signers::Error),
    #[error("login rejected: {0}")]
    Login(#[source] ApiError),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, wallet: &Wallet) -> Result<SessionToken, AuthError>;
}

#[derive(Clone, Debug)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn get_nonce(&self, wallet: &Wallet) -> Result<NonceData, ApiError> {
        let path = format!("/auth/nonce/{}", wallet.address());
        self.api.fetch_data(&RequestParams::get(&path)).await
    }
}

#[async_trait]
impl Authenticator for AuthClient {
    async fn login(&self, wallet: &Wallet) -> Result<SessionToken, AuthError> {
        let address = wallet.address();
        tracing::info!("Attempting to log in with wallet: {address}");

        let nonce = self.get_nonce(wallet).await.map_err(AuthError::Nonce)?;
        let signature = wallet.sign_message(&nonce.message).await?;

        let request = LoginRequest {
            wallet_address: address,
            signature: hex::encode_prefixed(signature.as_bytes()),
            message: &nonce.message,
        };

        let login: LoginData = self
            .api
            .fetch_data(&RequestParams::post("/auth/login", &request))
            .await
            .map_err(AuthError::Login)?;

        tracing::info!("Successfully logged in with wallet: {address}");
        Ok(SessionToken::new(login.access_token))
    }
}

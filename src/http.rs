use std::time::Duration;

use rand::{seq::SliceRandom, thread_rng};
use reqwest::{
    header::{HeaderMap, HeaderValue, REFERER, USER_AGENT},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{constants::HTTP_TIMEOUT_SECS, types::SessionToken};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) Gecko/20100101 Firefox/131.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 Edg/130.0.0.0",
];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response has no data: {0}")]
    MissingData(String),
}

pub struct RequestParams<'a, S: Serialize> {
    pub path: &'a str,
    pub method: Method,
    pub body: Option<S>,
    pub query_args: Option<&'a [(&'a str, String)]>,
    pub bearer: Option<&'a SessionToken>,
}

impl<'a> RequestParams<'a, ()> {
    pub fn get(path: &'a str) -> Self {
        Self {
            path,
            method: Method::GET,
            body: None,
            query_args: None,
            bearer: None,
        }
    }
}

impl<'a, S: Serialize> RequestParams<'a, S> {
    pub fn post(path: &'a str, body: S) -> Self {
        Self {
            path,
            method: Method::POST,
            body: Some(body),
            query_args: None,
            bearer: None,
        }
    }

    pub fn with_query(mut self, query_args: &'a [(&'a str, String)]) -> Self {
        self.query_args = Some(query_args);
        self
    }

    pub fn with_bearer(mut self, token: &'a SessionToken) -> Self {
        self.bearer = Some(token);
        self
    }
}

/// `{ success, data }` envelope every endpoint answers with.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    body: Value,
}

impl ApiResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    pub fn success(&self) -> bool {
        self.body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match self.body.get("data") {
            Some(data) if !data.is_null() => Ok(serde_json::from_value(data.clone())?),
            _ => Err(ApiError::MissingData(self.body.to_string())),
        }
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

fn get_headers(referer: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
    headers.insert(REFERER, referer.clone());

    headers
}

/// REST client for the property API. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    referer: HeaderValue,
}

impl ApiClient {
    pub fn new(base_url: &str, referer: &str) -> eyre::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            referer: HeaderValue::from_str(referer)?,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn send_http_request(
        &self,
        request_params: &RequestParams<'_, impl Serialize>,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = self
            .client
            .request(request_params.method.clone(), self.url(request_params.path))
            .headers(get_headers(&self.referer));

        if let Some(params) = request_params.query_args {
            request = request.query(params);
        }

        if let Some(body) = &request_params.body {
            request = request.json(body);
        }

        if let Some(token) = request_params.bearer {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body: text });
        }

        Ok(ApiResponse::new(serde_json::from_str(&text)?))
    }

    pub async fn fetch_data<T: DeserializeOwned>(
        &self,
        request_params: &RequestParams<'_, impl Serialize>,
    ) -> Result<T, ApiError> {
        self.send_http_request(request_params).await?.data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Nonce {
        message: String,
    }

    #[test]
    fn envelope_data_is_decoded() {
        let response = ApiResponse::new(json!({ "success": true, "data": { "message": "hi" } }));
        assert!(response.success());
        assert_eq!(
            response.data::<Nonce>().unwrap(),
            Nonce {
                message: "hi".into()
            }
        );
    }

    #[test]
    fn envelope_without_data_is_an_error() {
        let response = ApiResponse::new(json!({ "success": false, "message": "expired" }));
        assert!(!response.success());
        let err = response.data::<Nonce>().unwrap_err();
        assert!(matches!(err, ApiError::MissingData(ref body) if body.contains("expired")));

        let response = ApiResponse::new(json!({ "data": null }));
        assert!(matches!(response.data::<Nonce>(), Err(ApiError::MissingData(_))));
    }

    #[test]
    fn envelope_with_wrong_shape_is_a_decode_error() {
        let response = ApiResponse::new(json!({ "data": { "msg": 1 } }));
        assert!(matches!(response.data::<Nonce>(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn headers_carry_referer_and_known_user_agent() {
        let referer = HeaderValue::from_static("https://testnet.novastro.xyz/");
        let headers = get_headers(&referer);

        assert_eq!(headers.get(REFERER), Some(&referer));
        let agent = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(USER_AGENTS.contains(&agent));
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let client = ApiClient::new("https://api.example.com/v1/", "https://example.com/").unwrap();
        assert_eq!(client.url("/auth/login"), "https://api.example.com/v1/auth/login");
    }

    #[test]
    fn builders_fill_request_params() {
        let token = SessionToken::new("t");
        let query = [("page", "1".to_string())];
        let params = RequestParams::post("/x", json!({ "a": 1 }))
            .with_query(&query)
            .with_bearer(&token);

        assert_eq!(params.method, Method::POST);
        assert_eq!(params.query_args.unwrap().len(), 1);
        assert!(params.bearer.is_some());
        assert!(RequestParams::get("/y").body.is_none());
    }
}

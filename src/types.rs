//! Wire models for the property API.

use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_PURCHASE_AMOUNT;

/// `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Bearer token for one wallet and one run.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct NonceData {
    pub message: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub wallet_address: Address,
    pub signature: String,
    pub message: &'a str,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PropertiesPage {
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Property {
    pub id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub token: Option<PropertyToken>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyToken {
    #[serde(default)]
    pub minimum_investment: Option<Value>,
}

impl Property {
    /// Path segment form of the id, which the API serves as either a string or a number.
    pub fn id(&self) -> String {
        match &self.id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }

    /// The token's minimum investment, or the default amount when it is missing, zero or empty.
    pub fn purchase_amount(&self) -> String {
        let minimum = self
            .token
            .as_ref()
            .and_then(|token| token.minimum_investment.as_ref());

        match minimum {
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => DEFAULT_PURCHASE_AMOUNT.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PrepareRequest<'a> {
    pub purchase_amount: &'a str,
}

/// Server-issued, single-use set of transactions that must all confirm before submit.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseIntent {
    pub transaction_event_id: Value,
    #[serde(default)]
    pub payload: Vec<PayloadStep>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PayloadStep {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    pub to: Address,
    #[serde(default)]
    pub data: Option<Bytes>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl PayloadStep {
    /// Wei value to attach. Missing or empty means zero; strings may be decimal or `0x` hex.
    pub fn value(&self) -> eyre::Result<U256> {
        match &self.value {
            None | Some(Value::Null) => Ok(U256::ZERO),
            Some(Value::String(s)) if s.is_empty() => Ok(U256::ZERO),
            Some(Value::String(s)) => match s.strip_prefix("0x") {
                Some(hex) if hex.is_empty() => Ok(U256::ZERO),
                Some(hex) => Ok(U256::from_str_radix(hex, 16)?),
                None => Ok(U256::from_str(s)?),
            },
            Some(Value::Number(n)) => n
                .as_u64()
                .map(U256::from)
                .ok_or_else(|| eyre::eyre!("Unsupported transaction value {n}")),
            Some(other) => eyre::bail!("Unsupported transaction value {other}"),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest<'a> {
    pub transaction_event_id: &'a Value,
    pub transaction_hash: String,
}

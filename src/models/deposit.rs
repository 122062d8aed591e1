//! Deposit records returned by `/api/deposit/pending` and `/api/deposit/history`.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Lifecycle status of a detected deposit.
///
/// The backend moves deposits through `PENDING → CONFIRMING → CONFIRMED →
/// CREDITED`, or to `FAILED`. Statuses this client does not know are kept
/// verbatim so they can still be displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositStatus {
    Pending,
    Confirming,
    Confirmed,
    Credited,
    Failed,
    Other(String),
}

impl DepositStatus {
    /// Returns the upper-case wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirming => "CONFIRMING",
            Self::Confirmed => "CONFIRMED",
            Self::Credited => "CREDITED",
            Self::Failed => "FAILED",
            Self::Other(raw) => raw,
        }
    }

    /// Returns `true` for statuses that end a deposit's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Credited | Self::Failed)
    }
}

impl From<String> for DepositStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "CONFIRMING" => Self::Confirming,
            "CONFIRMED" => Self::Confirmed,
            "CREDITED" => Self::Credited,
            "FAILED" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl<'de> Deserialize<'de> for DepositStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deposit as reported by the backend. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    pub id: String,
    pub transaction_hash: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
    /// Amount in base units, as an exact decimal integer string.
    #[serde(deserialize_with = "base_units")]
    pub amount: String,
    /// `None` for the native asset.
    #[serde(default)]
    pub token_address: Option<String>,
    pub status: DepositStatus,
    #[serde(default)]
    pub confirmations: u32,
    #[serde(default, deserialize_with = "optional_block")]
    pub block_number: Option<u64>,
    /// Server timestamp, parsed only for display.
    pub created_at: String,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default, alias = "etherscanUrl")]
    pub explorer_url: Option<String>,
}

impl DepositRecord {
    /// Returns the token address, treating an empty string as native.
    pub fn token(&self) -> Option<&str> {
        self.token_address.as_deref().filter(|t| !t.is_empty())
    }
}

/// Accepts an amount sent either as a JSON string or as an integer of any
/// size, keeping every digit.
fn base_units<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "amount must be a string or integer, got {other}"
        ))),
    }
}

/// Accepts a block number sent as an integer, a numeric string, or null.
fn optional_block<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid block number {n}"))),
        serde_json::Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid block number {s:?}"))),
        other => Err(D::Error::custom(format!("invalid block number {other}"))),
    }
}

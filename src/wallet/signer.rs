//! Signer capability and submission result decoding.

use crate::error::{Error, Result};
use crate::payload::Payload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Descriptor handed to the signer.
///
/// Serializes as `{ "type": "entry_function_payload", "function": .., "type_arguments": .., "arguments": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(flatten)]
    pub payload: Payload,
}

impl SignRequest {
    pub const ENTRY_FUNCTION: &'static str = "entry_function_payload";

    pub fn entry_function(payload: Payload) -> Self {
        Self {
            kind: Self::ENTRY_FUNCTION,
            payload,
        }
    }
}

/// An external capability that authorizes and submits a payload.
///
/// Implementations return the signer's raw result; rejection is an
/// [`Error::Signer`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign_and_submit(&self, request: &SignRequest) -> Result<Value>;
}

/// Canonical transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHandle(String);

impl TransactionHandle {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shapes a signer result may take.
#[derive(Debug, Clone, PartialEq)]
pub enum SignerResponse {
    Bare(String),
    Receipt {
        hash: Option<Value>,
        transaction_hash: Option<Value>,
    },
    Unrecognized(Value),
}

impl From<Value> for SignerResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Bare(s),
            Value::Object(mut map) => Self::Receipt {
                hash: map.remove("hash"),
                transaction_hash: map.remove("transaction_hash"),
            },
            other => Self::Unrecognized(other),
        }
    }
}

impl SignerResponse {
    /// Decode a raw signer result. Never fails.
    pub fn decode(value: Value) -> Self {
        Self::from(value)
    }

    /// Pick the identifier: bare string, then `hash`, then `transaction_hash`.
    /// Empty strings do not count.
    pub fn into_submission(self) -> Submission {
        let non_empty = |v: Option<Value>| match v {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };

        let hash = match self {
            Self::Bare(s) if !s.is_empty() => Some(s),
            Self::Bare(_) | Self::Unrecognized(_) => None,
            Self::Receipt {
                hash,
                transaction_hash,
            } => non_empty(hash).or_else(|| non_empty(transaction_hash)),
        };

        match hash {
            Some(hash) => Submission::Submitted(TransactionHandle(hash)),
            None => Submission::NoIdentifier,
        }
    }
}

/// Result of a successful hand-off to the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Submitted(TransactionHandle),
    /// The signer accepted but returned nothing we can poll for.
    NoIdentifier,
}

impl Submission {
    pub fn handle(&self) -> Option<&TransactionHandle> {
        match self {
            Self::Submitted(handle) => Some(handle),
            Self::NoIdentifier => None,
        }
    }
}

/// Hand a payload to the signer and normalize its result.
///
/// Any signer failure surfaces as [`Error::Signer`].
pub async fn submit(payload: Payload, signer: &dyn Signer) -> Result<Submission> {
    let request = SignRequest::entry_function(payload);

    let raw = signer.sign_and_submit(&request).await.map_err(|e| match e {
        Error::Signer(reason) => Error::Signer(reason),
        other => Error::signer(other.to_string()),
    })?;

    let submission = SignerResponse::decode(raw).into_submission();
    match &submission {
        Submission::Submitted(handle) => {
            info!(hash = %handle, function = %request.payload.function, "Transaction submitted");
        }
        Submission::NoIdentifier => {
            warn!(function = %request.payload.function, "Signer returned no transaction identifier");
        }
    }

    Ok(submission)
}

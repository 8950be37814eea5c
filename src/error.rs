//! Error types for the Perception client.

use thiserror::Error;

/// The main error type for Perception.
///
/// Every variant is scoped to a single action attempt; nothing here is
/// fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (config files, log directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors from the node or wallet bridge.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or invalid node URL / module address.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad or missing user input, caught before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No signer or no account available.
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// The signer rejected or failed to submit the transaction.
    #[error("Submission failed: {0}")]
    Signer(String),

    /// A single node request failed.
    #[error("Network error: {0}")]
    Network(String),

    /// The ledger executed the transaction and it failed.
    #[error("Transaction failed on chain: {status}")]
    OnChain { status: String },
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new signer error.
    pub fn signer(msg: impl Into<String>) -> Self {
        Self::Signer(msg.into())
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new on-chain failure.
    pub fn on_chain(status: impl Into<String>) -> Self {
        Self::OnChain {
            status: status.into(),
        }
    }

    /// Check if the user can correct the problem and retry the whole flow.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::WalletNotConnected
                | Self::Signer(_)
                | Self::Network(_)
                | Self::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::validation("empty question").is_recoverable());
        assert!(Error::signer("User rejected the request").is_recoverable());
        assert!(Error::WalletNotConnected.is_recoverable());
        assert!(!Error::on_chain("Move abort").is_recoverable());
        assert!(!Error::config("module address missing").is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::on_chain("OUT_OF_GAS").to_string(),
            "Transaction failed on chain: OUT_OF_GAS"
        );
        assert_eq!(
            Error::signer("declined").to_string(),
            "Submission failed: declined"
        );
    }
}

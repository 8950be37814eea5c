//! Wallet integration.
//!
//! The signer is an external capability: it may prompt a human, may reject,
//! and returns one of several result shapes. This module decodes those
//! shapes once into a [`Submission`].

mod bridge;
mod signer;

pub use bridge::WalletBridge;
pub use signer::{SignRequest, Signer, SignerResponse, Submission, TransactionHandle, submit};

#[cfg(test)]
pub use signer::MockSigner;

use std::sync::Arc;

/// Wallet state passed explicitly into each flow.
#[derive(Clone, Default)]
pub struct WalletContext {
    signer: Option<Arc<dyn Signer>>,
    account: Option<String>,
}

impl WalletContext {
    pub fn new(signer: Arc<dyn Signer>, account: impl Into<String>) -> Self {
        Self {
            signer: Some(signer),
            account: Some(account.into()),
        }
    }

    /// A context with no wallet attached.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Connected means both a signer and an account are present.
    pub fn is_connected(&self) -> bool {
        self.signer.is_some() && self.account.as_deref().is_some_and(|a| !a.is_empty())
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// The signer, or [`crate::Error::WalletNotConnected`].
    pub fn signer(&self) -> crate::Result<&Arc<dyn Signer>> {
        if !self.is_connected() {
            return Err(crate::Error::WalletNotConnected);
        }
        self.signer.as_ref().ok_or(crate::Error::WalletNotConnected)
    }
}

impl std::fmt::Debug for WalletContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletContext")
            .field("connected", &self.is_connected())
            .field("account", &self.account)
            .finish()
    }
}

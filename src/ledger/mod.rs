//! Ledger node integration.
//!
//! This module reads transaction status from a fullnode and turns the
//! responses into confirmation outcomes.

mod client;
mod converter;
mod poller;

pub use client::{LedgerNode, NodeClient, NodeClientBuilder};
pub use converter::{StatusConverter, TransactionStatus};
pub use poller::{ConfirmationPoller, ConfirmationResult};

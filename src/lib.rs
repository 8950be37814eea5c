//! # Perception - Aptos opinion market client
//!
//! Builds entry-function payloads for an on-chain prediction market,
//! submits them through an external wallet signer, and polls a fullnode
//! until each transaction reaches a terminal status.
//!
//! ## Architecture
//!
//! - **Payload**: pure builders for create-market, buy-yes and buy-no calls
//! - **Wallet**: the signer capability and submission result decoding
//! - **Ledger**: fullnode client and fixed-interval confirmation poller
//! - **Flows**: per-action orchestration and outcome reporting
//! - **State**: form input, flow phases and user notifications
//! - **Config**: layered configuration

pub mod app;
pub mod config;
pub mod error;
pub mod flows;
pub mod ledger;
pub mod payload;
pub mod state;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
pub use flows::{ActionContext, ActionOutcome, ActionReport, CreateMarketFlow, TradeFlow};
pub use ledger::{ConfirmationPoller, ConfirmationResult, LedgerNode, NodeClient};
pub use payload::{Payload, PayloadBuilder, Side};
pub use wallet::{Signer, Submission, TransactionHandle, WalletContext};

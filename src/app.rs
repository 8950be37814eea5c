//! Main application module.
//!
//! `App` wires configuration into the node client, wallet and poller, and
//! exposes one entry point per action.

use crate::config::Config;
use crate::error::Result;
use crate::flows::{ActionContext, ActionReport, CreateMarketFlow, TradeFlow};
use crate::ledger::{ConfirmationPoller, NodeClient};
use crate::payload::Side;
use crate::state::{MarketForm, TradeForm};
use crate::wallet::{WalletBridge, WalletContext};
use std::sync::Arc;
use tokio::sync::watch;

/// The main application.
pub struct App {
    /// Configuration.
    config: Config,
    /// Dependencies shared by every action.
    ctx: ActionContext,
}

impl App {
    /// Create a new application.
    pub fn new(config: Config) -> Result<Self> {
        let node = NodeClient::builder().config(&config.ledger).build()?;
        let poller =
            ConfirmationPoller::new(Arc::new(node)).with_interval(config.ledger.poll_interval());

        let wallet = match WalletBridge::from_config(&config.wallet) {
            Ok(Some(bridge)) => {
                let account = bridge.account().to_string();
                WalletContext::new(Arc::new(bridge), account)
            }
            Ok(None) => {
                tracing::warn!("No wallet bridge configured; wallet is disconnected");
                WalletContext::disconnected()
            }
            Err(e) => {
                tracing::warn!("Failed to create wallet bridge: {}", e);
                WalletContext::disconnected()
            }
        };

        let ctx = ActionContext::new(config.ledger.clone(), wallet, poller);
        Ok(Self { config, ctx })
    }

    /// Stop waiting for confirmations once `cancel` flips to `true`.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.ctx = self.ctx.with_cancel(cancel);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }

    /// A trade form pre-filled with the configured defaults.
    pub fn trade_form(&self, market_id: u64, side: Side, amount: impl Into<String>) -> TradeForm {
        TradeForm {
            market_id: Some(market_id),
            side,
            amount: amount.into(),
            ..TradeForm::with_defaults(&self.config.trade)
        }
    }

    pub async fn create_market(&self, form: &mut MarketForm) -> ActionReport {
        CreateMarketFlow::new(&self.ctx)
            .on_created(|hash| {
                if !hash.is_empty() {
                    tracing::info!("Market created in transaction {}", hash);
                }
            })
            .run(form)
            .await
    }

    pub async fn trade(&self, form: &mut TradeForm) -> ActionReport {
        TradeFlow::new(&self.ctx).run(form).await
    }
}

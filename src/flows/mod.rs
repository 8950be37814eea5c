//! Action orchestrators.
//!
//! Each flow runs one action through validation, signing and confirmation:
//!
//! ```text
//! Idle -> Validating -> AwaitingSignature -> AwaitingConfirmation
//!      -> { Confirmed, ConfirmationTimedOut, Cancelled, Failed }
//! ```
//!
//! Flows own every value they create; concurrent actions share only the
//! read-only [`ActionContext`].

mod create_market;
mod trade;

pub use create_market::CreateMarketFlow;
pub use trade::TradeFlow;

use crate::config::LedgerConfig;
use crate::error::{Error, Result};
use crate::ledger::{ConfirmationPoller, ConfirmationResult};
use crate::payload::{Payload, PayloadBuilder};
use crate::state::{FlowPhase, FlowState, Notification};
use crate::wallet::{Submission, TransactionHandle, WalletContext, submit};
use tokio::sync::watch;
use tracing::{Span, error, info, info_span, warn};
use uuid::Uuid;

/// Explicit dependencies of a flow.
#[derive(Clone)]
pub struct ActionContext {
    ledger: LedgerConfig,
    wallet: WalletContext,
    poller: ConfirmationPoller,
    cancel: Option<watch::Receiver<bool>>,
}

impl ActionContext {
    pub fn new(ledger: LedgerConfig, wallet: WalletContext, poller: ConfirmationPoller) -> Self {
        Self {
            ledger,
            wallet,
            poller,
            cancel: None,
        }
    }

    /// Stop confirmation polling when `cancel` flips to `true`.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn wallet(&self) -> &WalletContext {
        &self.wallet
    }

    pub fn ledger(&self) -> &LedgerConfig {
        &self.ledger
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.wallet.is_connected() {
            Ok(())
        } else {
            Err(Error::WalletNotConnected)
        }
    }

    /// Payload builder for the configured module. Fails if the node URL or
    /// module address is missing.
    fn payload_builder(&self) -> Result<PayloadBuilder> {
        self.ledger.ensure_configured()?;
        Ok(PayloadBuilder::new(
            self.ledger.module_address.trim(),
            self.ledger.module_name.as_str(),
        ))
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("ledger", &self.ledger)
            .field("wallet", &self.wallet)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// Which action a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CreateMarket,
    Trade,
}

/// Terminal outcome of one action.
#[derive(Debug)]
pub enum ActionOutcome {
    Confirmed { hash: TransactionHandle },
    /// The signer accepted but returned no identifier. Treated as success
    /// without confirmation.
    SubmittedUnconfirmed,
    /// Submitted, but no terminal status before the deadline. May still land.
    TimedOut { hash: TransactionHandle },
    Cancelled { hash: TransactionHandle },
    Failed(Error),
}

impl ActionOutcome {
    pub fn hash(&self) -> Option<&TransactionHandle> {
        match self {
            Self::Confirmed { hash } | Self::TimedOut { hash } | Self::Cancelled { hash } => {
                Some(hash)
            }
            Self::SubmittedUnconfirmed | Self::Failed(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether the flow's success effect (clear inputs, notify) applies.
    pub fn applies_success_effect(&self) -> bool {
        matches!(
            self,
            Self::Confirmed { .. } | Self::SubmittedUnconfirmed | Self::TimedOut { .. }
        )
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Everything a caller learns about one action.
#[derive(Debug)]
pub struct ActionReport {
    pub action_id: Uuid,
    pub kind: ActionKind,
    pub outcome: ActionOutcome,
    pub state: FlowState,
}

impl ActionReport {
    pub fn phase(&self) -> FlowPhase {
        self.state.phase()
    }

    pub fn hash(&self) -> Option<&TransactionHandle> {
        self.outcome.hash()
    }

    /// User-facing message for this outcome.
    pub fn notification(&self) -> Notification {
        let (done, noun) = match self.kind {
            ActionKind::CreateMarket => ("Market created!", "Market creation"),
            ActionKind::Trade => ("Trade successful! Your perception has been recorded.", "Trade"),
        };

        match &self.outcome {
            ActionOutcome::Confirmed { .. } => Notification::success(done),
            ActionOutcome::SubmittedUnconfirmed => Notification::info(format!(
                "{} submitted. The wallet returned no transaction hash to confirm.",
                noun
            )),
            ActionOutcome::TimedOut { hash } => Notification::warning(format!(
                "Transaction {} submitted but confirmation timed out. Check your wallet.",
                hash
            )),
            ActionOutcome::Cancelled { hash } => Notification::info(format!(
                "Stopped waiting for transaction {}. Check your wallet.",
                hash
            )),
            ActionOutcome::Failed(Error::WalletNotConnected) => {
                let what = match self.kind {
                    ActionKind::CreateMarket => "create markets",
                    ActionKind::Trade => "trade",
                };
                Notification::error(format!("Please connect your Aptos wallet to {}", what))
            }
            ActionOutcome::Failed(Error::Validation(msg) | Error::Config(msg)) => {
                Notification::error(msg.clone())
            }
            ActionOutcome::Failed(e) => Notification::error(format!("{} failed: {}", noun, e)),
        }
    }
}

/// One in-progress action: its id and phase.
struct Attempt {
    id: Uuid,
    kind: ActionKind,
    state: FlowState,
}

impl Attempt {
    fn new(kind: ActionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            state: FlowState::new(),
        }
    }

    /// Span carrying the action id onto every event of this attempt,
    /// including those from the signer and the poller.
    fn span(&self) -> Span {
        info_span!("action", kind = ?self.kind, action_id = %self.id)
    }

    fn validating(&mut self) {
        self.state.advance(FlowPhase::Validating);
    }

    fn finish(mut self, phase: FlowPhase, outcome: ActionOutcome) -> ActionReport {
        self.state.advance(phase);
        ActionReport {
            action_id: self.id,
            kind: self.kind,
            outcome,
            state: self.state,
        }
    }

    fn fail(self, err: Error) -> ActionReport {
        match &err {
            Error::Validation(_) | Error::WalletNotConnected | Error::Config(_) => {
                warn!("Rejected: {}", err);
            }
            _ => error!("Failed: {}", err),
        }
        self.finish(FlowPhase::Failed, ActionOutcome::Failed(err))
    }

    /// Sign, submit and confirm a built payload.
    async fn submit_and_confirm(mut self, ctx: &ActionContext, payload: Payload) -> ActionReport {
        self.state.advance(FlowPhase::AwaitingSignature);

        let signer = match ctx.wallet.signer() {
            Ok(signer) => signer,
            Err(e) => return self.fail(e),
        };

        let handle = match submit(payload, signer.as_ref()).await {
            Ok(Submission::Submitted(handle)) => handle,
            Ok(Submission::NoIdentifier) => {
                warn!("No transaction identifier; skipping confirmation");
                return self.finish(FlowPhase::Confirmed, ActionOutcome::SubmittedUnconfirmed);
            }
            Err(e) => return self.fail(e),
        };

        self.state.advance(FlowPhase::AwaitingConfirmation);
        let result = ctx
            .poller
            .confirm_with_cancel(&handle, ctx.ledger.confirm_timeout(), ctx.cancel.clone())
            .await;

        match result {
            ConfirmationResult::Success => {
                info!(hash = %handle, "Action confirmed");
                self.finish(FlowPhase::Confirmed, ActionOutcome::Confirmed { hash: handle })
            }
            ConfirmationResult::OnChainFailure(status) => self.fail(Error::on_chain(status)),
            ConfirmationResult::Timeout => {
                warn!(hash = %handle, "Could not confirm transaction within timeout");
                self.finish(
                    FlowPhase::ConfirmationTimedOut,
                    ActionOutcome::TimedOut { hash: handle },
                )
            }
            ConfirmationResult::Cancelled => {
                self.finish(FlowPhase::Cancelled, ActionOutcome::Cancelled { hash: handle })
            }
        }
    }
}

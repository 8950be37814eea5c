//! Fixed-interval confirmation polling.

use super::client::LedgerNode;
use super::converter::{StatusConverter, TransactionStatus};
use crate::wallet::TransactionHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Terminal result of a polling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationResult {
    Success,
    OnChainFailure(String),
    /// Deadline passed without a terminal response. Outcome unknown.
    Timeout,
    /// Stopped by the caller before a terminal response.
    Cancelled,
}

/// Polls a ledger node until a transaction reaches a terminal status.
#[derive(Clone)]
pub struct ConfirmationPoller {
    node: Arc<dyn LedgerNode>,
    interval: Duration,
}

impl ConfirmationPoller {
    /// Delay between polls.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1_000);
    /// Default confirmation deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

    pub fn new(node: Arc<dyn LedgerNode>) -> Self {
        Self {
            node,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until terminal or `timeout` elapses.
    pub async fn confirm(&self, handle: &TransactionHandle, timeout: Duration) -> ConfirmationResult {
        self.confirm_with_cancel(handle, timeout, None).await
    }

    /// Like [`confirm`](Self::confirm), but also stops when `cancel` flips to
    /// `true`. A dropped sender never cancels.
    ///
    /// Request failures are logged and retried; they never end the session.
    pub async fn confirm_with_cancel(
        &self,
        handle: &TransactionHandle,
        timeout: Duration,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> ConfirmationResult {
        let start = Instant::now();
        let mut round: u32 = 0;

        while start.elapsed() < timeout {
            if cancel.as_mut().is_some_and(|rx| *rx.borrow_and_update()) {
                info!(hash = %handle, "Confirmation polling cancelled");
                return ConfirmationResult::Cancelled;
            }

            round += 1;
            match self.node.transaction_by_hash(handle.as_str()).await {
                Ok(body) => match StatusConverter::convert(&body) {
                    TransactionStatus::Succeeded => {
                        info!(hash = %handle, round, "Transaction confirmed");
                        return ConfirmationResult::Success;
                    }
                    TransactionStatus::Failed { vm_status } => {
                        warn!(hash = %handle, round, vm_status = %vm_status, "Transaction failed on chain");
                        return ConfirmationResult::OnChainFailure(vm_status);
                    }
                    TransactionStatus::Pending => {
                        debug!(hash = %handle, round, "Transaction pending");
                    }
                },
                Err(e) => {
                    debug!(hash = %handle, round, "Poll failed, retrying: {}", e);
                }
            }

            match cancel.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => {}
                        _ = cancelled(rx) => {
                            info!(hash = %handle, "Confirmation polling cancelled");
                            return ConfirmationResult::Cancelled;
                        }
                    }
                }
                None => tokio::time::sleep(self.interval).await,
            }
        }

        warn!(hash = %handle, rounds = round, "Confirmation timed out after {:?}", timeout);
        ConfirmationResult::Timeout
    }
}

/// Resolves once the flag is `true`. Pends forever if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedNode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn handle() -> TransactionHandle {
        TransactionHandle::new("0xabc")
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_after_pending_rounds() {
        let node = Arc::new(
            ScriptedNode::new()
                .pending(3)
                .then_body(json!({ "success": true, "vm_status": "Executed successfully" })),
        );
        let poller = ConfirmationPoller::new(node.clone());

        let start = Instant::now();
        let result = poller.confirm(&handle(), ConfirmationPoller::DEFAULT_TIMEOUT).await;

        assert_eq!(result, ConfirmationResult::Success);
        assert_eq!(node.requests(), 4);
        assert!(start.elapsed() >= Duration::from_millis(3_000));
        assert_eq!(node.requested_hashes(), vec!["0xabc"; 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_wait() {
        let node = Arc::new(ScriptedNode::new().then_body(json!({ "success": true })));
        let poller = ConfirmationPoller::new(node.clone());

        let start = Instant::now();
        let result = poller.confirm(&handle(), Duration::from_secs(60)).await;

        assert_eq!(result, ConfirmationResult::Success);
        assert_eq!(node.requests(), 1);
        assert!(start.elapsed() < Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_are_retried() {
        let node = Arc::new(
            ScriptedNode::new()
                .errors(2)
                .then_body(json!({ "success": false, "vm_status": "Move abort: E_MARKET_CLOSED" })),
        );
        let poller = ConfirmationPoller::new(node.clone());

        let result = poller.confirm(&handle(), Duration::from_secs(60)).await;

        assert_eq!(
            result,
            ConfirmationResult::OnChainFailure("Move abort: E_MARKET_CLOSED".to_string())
        );
        assert_eq!(node.requests(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_node_times_out() {
        let node = Arc::new(ScriptedNode::failing());
        let poller = ConfirmationPoller::new(node.clone());

        let start = Instant::now();
        let result = poller.confirm(&handle(), Duration::from_millis(5_000)).await;

        assert_eq!(result, ConfirmationResult::Timeout);
        assert!(start.elapsed() >= Duration::from_millis(5_000));
        assert_eq!(node.requests(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_never_polls() {
        let node = Arc::new(ScriptedNode::new().then_body(json!({ "success": true })));
        let poller = ConfirmationPoller::new(node.clone());

        let result = poller.confirm(&handle(), Duration::ZERO).await;

        assert_eq!(result, ConfirmationResult::Timeout);
        assert_eq!(node.requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_interval() {
        let node = Arc::new(ScriptedNode::new().pending(2).then_body(json!({ "success": true })));
        let poller = ConfirmationPoller::new(node.clone()).with_interval(Duration::from_millis(250));

        let start = Instant::now();
        let result = poller.confirm(&handle(), Duration::from_secs(60)).await;

        assert_eq!(result, ConfirmationResult::Success);
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(start.elapsed() < Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let node = Arc::new(ScriptedNode::new().pending(1_000));
        let poller = ConfirmationPoller::new(node.clone());
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn({
            let poller = poller.clone();
            async move {
                poller
                    .confirm_with_cancel(&handle(), Duration::from_secs(60), Some(rx))
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        tx.send(true).unwrap();

        assert_eq!(task.await.unwrap(), ConfirmationResult::Cancelled);
        assert_eq!(node.requests(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cancel_sender_keeps_polling() {
        let node = Arc::new(ScriptedNode::new().pending(2).then_body(json!({ "success": true })));
        let poller = ConfirmationPoller::new(node.clone());
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let result = poller
            .confirm_with_cancel(&handle(), Duration::from_secs(60), Some(rx))
            .await;

        assert_eq!(result, ConfirmationResult::Success);
        assert_eq!(node.requests(), 3);
    }
}

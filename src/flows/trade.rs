//! Trade flow: buy YES or NO shares in a market.

use super::{ActionContext, ActionKind, ActionReport, Attempt};
use crate::error::Error;
use crate::state::TradeForm;
use crate::wallet::TransactionHandle;
use tracing::{Instrument, info};

type CompleteCallback<'a> = Box<dyn FnMut(Option<&TransactionHandle>) + Send + 'a>;

/// Places a trade from a [`TradeForm`].
pub struct TradeFlow<'a> {
    ctx: &'a ActionContext,
    on_complete: Option<CompleteCallback<'a>>,
}

impl<'a> TradeFlow<'a> {
    pub fn new(ctx: &'a ActionContext) -> Self {
        Self {
            ctx,
            on_complete: None,
        }
    }

    /// Called after the trade is submitted, with its hash if the wallet
    /// returned one.
    pub fn on_complete(
        mut self,
        callback: impl FnMut(Option<&TransactionHandle>) + Send + 'a,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub async fn run(self, form: &mut TradeForm) -> ActionReport {
        let attempt = Attempt::new(ActionKind::Trade);
        let span = attempt.span();
        self.execute(attempt, form).instrument(span).await
    }

    async fn execute(mut self, mut attempt: Attempt, form: &mut TradeForm) -> ActionReport {
        attempt.validating();

        if form.has_missing_fields() {
            return attempt.fail(Error::validation("Market ID and amount are required"));
        }
        if let Err(e) = self.ctx.ensure_connected() {
            return attempt.fail(e);
        }
        let builder = match self.ctx.payload_builder() {
            Ok(builder) => builder,
            Err(e) => return attempt.fail(e),
        };
        let intent = match form.to_intent() {
            Ok(intent) => intent,
            Err(e) => return attempt.fail(e),
        };

        info!(
            market_id = intent.market_id,
            side = %intent.side,
            amount = %intent.amount,
            agreement = intent.agreement_percentage,
            slippage_bps = %intent.slippage_bps,
            "Placing trade"
        );
        let payload = builder.buy(
            intent.side,
            intent.market_id,
            intent.amount,
            intent.agreement_percentage,
        );
        let report = attempt.submit_and_confirm(self.ctx, payload).await;

        if report.outcome.applies_success_effect() {
            form.clear();
            if let Some(callback) = self.on_complete.as_mut() {
                callback(report.hash());
            }
        }

        report
    }
}

//! Create-market flow.

use super::{ActionContext, ActionKind, ActionReport, Attempt};
use crate::error::Error;
use crate::state::MarketForm;
use chrono::Utc;
use tracing::{Instrument, info};

type CreatedCallback<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Creates a binary market from a [`MarketForm`].
pub struct CreateMarketFlow<'a> {
    ctx: &'a ActionContext,
    on_created: Option<CreatedCallback<'a>>,
}

impl<'a> CreateMarketFlow<'a> {
    pub fn new(ctx: &'a ActionContext) -> Self {
        Self {
            ctx,
            on_created: None,
        }
    }

    /// Called with the transaction hash (or `""` when the wallet returned
    /// none) after the market is submitted.
    pub fn on_created(mut self, callback: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_created = Some(Box::new(callback));
        self
    }

    pub async fn run(self, form: &mut MarketForm) -> ActionReport {
        self.run_at(form, Utc::now().timestamp()).await
    }

    /// Run with an explicit notion of "now" for the future-resolution check.
    pub async fn run_at(self, form: &mut MarketForm, now_epoch_seconds: i64) -> ActionReport {
        let attempt = Attempt::new(ActionKind::CreateMarket);
        let span = attempt.span();
        self.execute(attempt, form, now_epoch_seconds).instrument(span).await
    }

    async fn execute(
        mut self,
        mut attempt: Attempt,
        form: &mut MarketForm,
        now_epoch_seconds: i64,
    ) -> ActionReport {
        attempt.validating();

        if form.has_missing_fields() {
            return attempt.fail(Error::validation(
                "Question, resolution date and resolution time are required",
            ));
        }
        if let Err(e) = self.ctx.ensure_connected() {
            return attempt.fail(e);
        }
        let builder = match self.ctx.payload_builder() {
            Ok(builder) => builder,
            Err(e) => return attempt.fail(e),
        };
        let draft = match form.to_draft(now_epoch_seconds) {
            Ok(draft) => draft,
            Err(e) => return attempt.fail(e),
        };

        info!(
            resolve_ts = draft.resolve_epoch_seconds,
            "Creating market: {}", draft.question
        );
        let payload = builder.create_market(&draft.question, draft.resolve_epoch_seconds);
        let report = attempt.submit_and_confirm(self.ctx, payload).await;

        if report.outcome.applies_success_effect() {
            form.clear();
            let hash = report.hash().map(|h| h.as_str()).unwrap_or_default();
            if let Some(callback) = self.on_created.as_mut() {
                callback(hash);
            }
        }

        report
    }
}

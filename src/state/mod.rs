//! Per-action state.
//!
//! Every value here is created by the flow that triggers a single action
//! and dies with it. Nothing is shared between actions.

mod flow_state;
mod market_form;
mod trade_form;

pub use flow_state::{FlowPhase, FlowState};
pub use market_form::{MarketDraft, MarketForm};
pub use trade_form::{TradeForm, TradeIntent};

/// A notification to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self.level {
            NotificationLevel::Info => "i",
            NotificationLevel::Success => "✓",
            NotificationLevel::Warning => "⏳",
            NotificationLevel::Error => "✗",
        };
        write!(f, "{} {}", symbol, self.message)
    }
}

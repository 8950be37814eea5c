//! Trade form input.

use crate::config::TradeDefaults;
use crate::error::{Error, Result};
use crate::payload::Side;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Raw trade input as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeForm {
    pub market_id: Option<u64>,
    pub side: Side,
    /// Amount in uUSD, as typed.
    pub amount: String,
    pub agreement_percentage: u8,
    /// Slippage tolerance in percent. Enforced by the program, not here.
    pub slippage_percent: Decimal,
}

/// Validated trade input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIntent {
    pub market_id: u64,
    pub side: Side,
    pub amount: Decimal,
    pub agreement_percentage: u8,
    pub slippage_bps: Decimal,
}

impl Default for TradeForm {
    fn default() -> Self {
        Self::with_defaults(&TradeDefaults::default())
    }
}

impl TradeForm {
    pub fn with_defaults(defaults: &TradeDefaults) -> Self {
        Self {
            market_id: None,
            side: Side::Yes,
            amount: String::new(),
            agreement_percentage: defaults.agreement_percentage,
            slippage_percent: defaults.slippage_percent,
        }
    }

    pub fn for_market(market_id: u64, side: Side, amount: impl Into<String>) -> Self {
        Self {
            market_id: Some(market_id),
            side,
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn has_missing_fields(&self) -> bool {
        self.market_id.is_none() || self.amount.trim().is_empty()
    }

    pub fn to_intent(&self) -> Result<TradeIntent> {
        let market_id = match self.market_id {
            Some(id) if !self.amount.trim().is_empty() => id,
            _ => return Err(Error::validation("Market ID and amount are required")),
        };

        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|_| Error::validation(format!("Invalid amount '{}'", self.amount)))?;
        if amount <= Decimal::ZERO {
            return Err(Error::validation("Amount must be greater than zero"));
        }

        if self.agreement_percentage > 100 {
            return Err(Error::validation(format!(
                "Agreement percentage must be between 0 and 100, got {}",
                self.agreement_percentage
            )));
        }

        Ok(TradeIntent {
            market_id,
            side: self.side,
            amount,
            agreement_percentage: self.agreement_percentage,
            slippage_bps: self.slippage_percent * Decimal::ONE_HUNDRED,
        })
    }

    /// Reset the amount after a submission.
    pub fn clear(&mut self) {
        self.amount.clear();
    }
}

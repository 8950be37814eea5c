//! Payload construction for create-market and trade calls.

use super::{Payload, Side};
use rust_decimal::Decimal;

/// Entry function names declared by the market module.
pub mod entry {
    pub const CREATE_MARKET: &str = "create_market";
    pub const BUY_YES: &str = "buy_yes";
    pub const BUY_NO: &str = "buy_no";
}

/// Builds payloads against one published module.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    module_address: String,
    module_name: String,
}

impl PayloadBuilder {
    pub fn new(module_address: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            module_address: module_address.into(),
            module_name: module_name.into(),
        }
    }

    /// Fully qualified function id for an entry point.
    pub fn function_id(&self, entry: &str) -> String {
        format!("{}::{}::{}", self.module_address, self.module_name, entry)
    }

    /// Payload for `create_market(question, resolve_ts)`.
    ///
    /// `resolve_epoch_seconds` must already be in the future.
    pub fn create_market(&self, question: &str, resolve_epoch_seconds: i64) -> Payload {
        self.entry_payload(
            entry::CREATE_MARKET,
            vec![question.to_string(), resolve_epoch_seconds.to_string()],
        )
    }

    pub fn buy_yes(&self, market_id: u64, amount: Decimal, agreement_percentage: u8) -> Payload {
        self.buy(Side::Yes, market_id, amount, agreement_percentage)
    }

    pub fn buy_no(&self, market_id: u64, amount: Decimal, agreement_percentage: u8) -> Payload {
        self.buy(Side::No, market_id, amount, agreement_percentage)
    }

    /// Payload for `buy_yes` / `buy_no(market_id, amount, agreement_percentage)`.
    pub fn buy(
        &self,
        side: Side,
        market_id: u64,
        amount: Decimal,
        agreement_percentage: u8,
    ) -> Payload {
        let entry = match side {
            Side::Yes => entry::BUY_YES,
            Side::No => entry::BUY_NO,
        };

        self.entry_payload(
            entry,
            vec![
                market_id.to_string(),
                amount.normalize().to_string(),
                agreement_percentage.to_string(),
            ],
        )
    }

    fn entry_payload(&self, entry: &str, arguments: Vec<String>) -> Payload {
        Payload {
            function: self.function_id(entry),
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

//! Conversion of node responses into transaction status.

use serde_json::Value;

/// Fallback status when a failed transaction carries no `vm_status`.
pub const UNKNOWN_VM_STATUS: &str = "unknown";

/// Status of a transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Not yet indexed or still executing.
    Pending,
    Succeeded,
    Failed { vm_status: String },
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Converts node JSON bodies to [`TransactionStatus`].
pub struct StatusConverter;

impl StatusConverter {
    /// A body is terminal if it has a `success` field (any value) or a
    /// truthy `vm_status`. Anything else is pending.
    pub fn convert(body: &Value) -> TransactionStatus {
        let success = body.get("success");
        let vm_status = body.get("vm_status").filter(|v| is_truthy(v));

        if success.is_none() && vm_status.is_none() {
            return TransactionStatus::Pending;
        }

        if success.is_some_and(is_truthy) {
            return TransactionStatus::Succeeded;
        }

        let vm_status = match vm_status {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => UNKNOWN_VM_STATUS.to_string(),
        };
        TransactionStatus::Failed { vm_status }
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

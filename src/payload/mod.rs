//! Entry-function payloads for the market program.
//!
//! Builders here are pure: they never touch the network or the signer and
//! perform no validation. Callers check preconditions first.

mod builder;

pub use builder::{PayloadBuilder, entry};

use serde::{Deserialize, Serialize};

/// A remote program call ready for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Fully qualified `<address>::<module>::<entry>`.
    pub function: String,
    /// Generic type arguments. Always empty for the market program.
    pub type_arguments: Vec<String>,
    /// Positional, string-encoded arguments.
    pub arguments: Vec<String>,
}

impl Payload {
    /// Name of the entry function, without address and module.
    pub fn entry_name(&self) -> &str {
        self.function.rsplit("::").next().unwrap_or(&self.function)
    }
}

/// Which outcome a trade buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Yes,
    No,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            other => Err(crate::Error::validation(format!(
                "Unknown side '{}', expected yes or no",
                other
            ))),
        }
    }
}

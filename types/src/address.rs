//! Opaque account address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque principal reference identifying a caller/account.
///
/// The vault never inspects the contents — addresses are only compared,
/// hashed, and echoed back. The host platform decides what they look like.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Create an address from a raw string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

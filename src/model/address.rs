//! Ledger address — the node identifier.

use serde::{Deserialize, Serialize};

/// Opaque ledger account address.
///
/// Identity is exact string equality after case-folding: the public datasets
/// mix checksummed and lower-case hex forms of the same account, so every
/// address is lower-cased on construction and never normalized further.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse a raw address field. Returns `None` for malformed input:
    /// empty after trimming, or containing whitespace. Anything
    /// address-shaped is accepted as-is (lower-cased) — the pipeline does
    /// not assume one ledger's address width.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

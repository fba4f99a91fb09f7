//! Symbol and free-text company queries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short uppercase identifier for a tradable instrument (e.g. `TSLA`, `BRK-B`, `^GSPC`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse a symbol: trims, uppercases, rejects empty or whitespace-containing input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid symbol: {value:?}"))
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Free text typed by a user. Not guaranteed to match any symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyQuery(String);

impl CompanyQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The text as typed.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Trimmed, whitespace-collapsed, lowercased form used as the cache key.
    pub fn normalized(&self) -> String {
        self.0
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// The query as a symbol, when it could be one. Used as the exact-match tie-break.
    pub fn as_symbol(&self) -> Option<Symbol> {
        Symbol::parse(&self.0)
    }
}

impl From<&str> for CompanyQuery {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

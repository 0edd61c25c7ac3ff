//! Symbol Normalization
//!
//! Callers pass a base asset symbol (e.g. `"SOL"`); the venue wants a trading
//! pair identifier (`"SOLUSDC"` on REST, `"solusdc@ticker"` on the stream).
//! Input that already carries a known quote suffix is accepted and re-quoted
//! to the configured quote asset, so `"SOLUSDT"` and `"sol"` normalize to the
//! same pair.

use std::fmt;

/// Quote asset appended to the base symbol to form the venue trading pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteAsset {
    /// USD Coin. Default quote currency.
    #[default]
    Usdc,
    /// Tether.
    Usdt,
}

impl QuoteAsset {
    /// Parse a quote asset from string, falling back to USDC.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "USDT" => Self::Usdt,
            _ => Self::Usdc,
        }
    }

    /// Get the venue suffix for this quote asset.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Usdc => "USDC",
            Self::Usdt => "USDT",
        }
    }
}

/// Error raised when a caller-supplied symbol cannot form a trading pair.
///
/// This is the only error the resolver ever surfaces to callers; everything
/// downstream of a successful `watch` is recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    /// The symbol was empty or all whitespace.
    #[error("symbol is empty")]
    Empty,
    /// The symbol contains a character outside `[A-Za-z0-9]`.
    #[error("symbol contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A validated base/quote trading pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPair {
    base: String,
    quote: QuoteAsset,
}

impl TradingPair {
    /// Known quote suffixes stripped from pre-paired input.
    const QUOTE_SUFFIXES: [&'static str; 2] = ["USDC", "USDT"];

    /// Normalize caller input into a trading pair against `quote`.
    ///
    /// Accepts a bare base symbol (`"SOL"`, `"sol"`) or a pre-paired venue
    /// symbol (`"SOLUSDT"`), which is re-quoted to `quote`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError`] for empty input or input containing
    /// non-alphanumeric characters.
    pub fn parse(input: &str, quote: QuoteAsset) -> Result<Self, SymbolError> {
        let raw = input.trim().to_uppercase();
        if raw.is_empty() {
            return Err(SymbolError::Empty);
        }
        if let Some(bad) = raw.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(SymbolError::InvalidCharacter(bad));
        }

        let base = Self::QUOTE_SUFFIXES
            .iter()
            .find_map(|suffix| raw.strip_suffix(suffix))
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(&raw);

        Ok(Self {
            base: base.to_string(),
            quote,
        })
    }

    /// Get the base asset symbol.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Get the quote asset.
    #[must_use]
    pub const fn quote(&self) -> QuoteAsset {
        self.quote
    }

    /// Get the venue ticker symbol, e.g. `"SOLUSDC"`.
    #[must_use]
    pub fn ticker_symbol(&self) -> String {
        format!("{}{}", self.base, self.quote.as_str())
    }

    /// Get the per-tick stream name, e.g. `"solusdc@ticker"`.
    #[must_use]
    pub fn stream_name(&self) -> String {
        format!("{}@ticker", self.ticker_symbol().to_lowercase())
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.quote.as_str())
    }
}

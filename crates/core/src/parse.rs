//! Free-text parsers for scraped market data.
//!
//! The hosting page (and the REST fallback that mimics it) delivers the
//! spot price and position rows as display text. These parsers are the only
//! place that text is interpreted; everything downstream works on typed
//! values.
//!
//! Grammars:
//! - spot price: first maximal run of `[0-9,.]` in the snippet, thousands
//!   separators (`,`) stripped, parsed as a decimal.
//! - position label: whitespace-tokenized; at least four tokens; the last
//!   two are `<STRIKE> <CALL|PUT>` (e.g. `"NIFTY 28 AUG 24800 CALL"`).
//! - quantity: optional sign, thousands separators stripped, integer.

use crate::types::{OptionType, Position, Strike};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

/// Failure to derive a spot price from display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No numeric token was present in the snippet.
    #[error("no parseable price in {snippet:?}")]
    NoPrice {
        /// The offending snippet (truncated for display).
        snippet: String,
    },
}

/// Extracts the spot price from a free-text snippet.
///
/// Takes the first run of digits, commas, and dots; strips commas; parses
/// the rest as a decimal.
///
/// # Errors
/// Returns `ParseError::NoPrice` when no parseable number is present.
pub fn parse_spot_price(text: &str) -> Result<Decimal, ParseError> {
    let no_price = || ParseError::NoPrice {
        snippet: text.chars().take(64).collect(),
    };

    let start = text
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(no_price)?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();

    token.parse::<Decimal>().map_err(|_| no_price())
}

/// Parses a position-row instrument label into (strike, option type).
///
/// Returns `None` for rows that do not match the expected shape; callers
/// skip such rows rather than failing the whole snapshot.
#[must_use]
pub fn parse_position_label(label: &str) -> Option<(Strike, OptionType)> {
    let parts: Vec<&str> = label.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }
    let option_type = OptionType::from_label(parts[parts.len() - 1])?;
    let strike = parts[parts.len() - 2].parse::<u32>().ok()?;
    Some((Strike(strike), option_type))
}

/// Parses a signed quantity string (`"-50"`, `"1,250"`).
#[must_use]
pub fn parse_signed_quantity(text: &str) -> Option<i64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<i64>().ok()
}

/// Parses one raw position row into a typed [`Position`].
///
/// Rows with unparseable labels or quantities are dropped (logged at debug).
#[must_use]
pub fn parse_position_row(label: &str, quantity: &str) -> Option<Position> {
    let (strike, option_type) = match parse_position_label(label) {
        Some(parsed) => parsed,
        None => {
            debug!(label, "skipping position row with unrecognized label");
            return None;
        }
    };
    let quantity = match parse_signed_quantity(quantity) {
        Some(q) => q,
        None => {
            debug!(label, quantity, "skipping position row with bad quantity");
            return None;
        }
    };
    Some(Position {
        strike,
        option_type,
        quantity,
    })
}

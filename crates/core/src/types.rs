//! Domain value types for the straddle ladder assistant.
//!
//! Strikes are integer rupee levels (NIFTY weeklies trade on a 50-point
//! grid); the scraped spot price uses `rust_decimal::Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Strike
// =============================================================================

/// A strike price level.
///
/// Always a multiple of the configured strike step for the underlying
/// (50 for NIFTY). Carries no identity beyond its numeric value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Strike(pub u32);

impl Strike {
    /// Rounds a spot price to the nearest multiple of `step` (the ATM strike).
    ///
    /// `center = round(price / step) * step`, so the result is never more
    /// than `step / 2` away from the spot. Midpoints round up: a spot of
    /// exactly 24825 centers on 24850, not 24800.
    #[must_use]
    pub fn round_from_spot(spot: Decimal, step: u32) -> Self {
        let step_dec = Decimal::from(step);
        let ratio =
            (spot / step_dec).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        // NIFTY trades in the tens of thousands; u32 cannot overflow here.
        let rounded = (ratio * step_dec).to_u32().unwrap_or(0);
        Self(rounded)
    }

    /// The strike one step above.
    #[must_use]
    pub fn up(self, step: u32) -> Self {
        Self(self.0 + step)
    }

    /// The strike one step below.
    #[must_use]
    pub fn down(self, step: u32) -> Self {
        Self(self.0.saturating_sub(step))
    }
}

impl fmt::Display for Strike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Option legs
// =============================================================================

/// Call or put side of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Call option (Dhan code `CE`).
    Call,
    /// Put option (Dhan code `PE`).
    Put,
}

impl OptionType {
    /// Dhan scrip-master / order code: `CE` or `PE`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }

    /// Parses the Dhan code (`CE`/`PE`).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CE" => Some(Self::Call),
            "PE" => Some(Self::Put),
            _ => None,
        }
    }

    /// Parses the position-table label (`CALL`/`PUT`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "CALL" => Some(Self::Call),
            "PUT" => Some(Self::Put),
            _ => None,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One side of a straddle: a (strike, option type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionLeg {
    /// Strike price level.
    pub strike: Strike,
    /// Call or put.
    pub option_type: OptionType,
}

impl OptionLeg {
    /// Creates a leg.
    #[must_use]
    pub fn new(strike: Strike, option_type: OptionType) -> Self {
        Self {
            strike,
            option_type,
        }
    }

    /// Both legs of the straddle at `strike`, call first.
    #[must_use]
    pub fn straddle(strike: Strike) -> [Self; 2] {
        [
            Self::new(strike, OptionType::Call),
            Self::new(strike, OptionType::Put),
        ]
    }
}

impl fmt::Display for OptionLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.strike, self.option_type)
    }
}

// =============================================================================
// Transaction side
// =============================================================================

/// Brokerage transaction side.
///
/// Entering a short straddle SELLs both legs; exiting BUYs them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionSide {
    /// Buy to close a short leg.
    Buy,
    /// Sell to open a short leg.
    Sell,
}

impl TransactionSide {
    /// Wire value for the Dhan order API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for TransactionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Position
// =============================================================================

/// A live position derived from a scraped/fetched row.
///
/// Negative quantity denotes a short (sold) leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Strike of the contract.
    pub strike: Strike,
    /// Call or put.
    pub option_type: OptionType,
    /// Signed net quantity; negative means short.
    pub quantity: i64,
}

impl Position {
    /// Returns true for a sold (short) leg.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.quantity < 0
    }
}

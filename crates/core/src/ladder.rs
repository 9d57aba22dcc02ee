//! The three-strike straddle ladder and its transition arithmetic.
//!
//! A ladder holds exactly 0 strikes (uninitiated) or 3 strikes (active),
//! always sorted ascending. All operations here are pure; order placement
//! happens in the engine crate against the plans produced here.

use crate::types::Strike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ladder state errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LadderError {
    /// A roll was requested without an active three-strike ladder.
    #[error("not tracking three active straddles (have {tracked})")]
    InvalidState {
        /// Number of strikes currently tracked.
        tracked: usize,
    },
}

/// The set of strikes the assistant currently manages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ladder {
    strikes: Vec<Strike>,
}

/// A planned roll transition: which straddle to buy back, which to sell,
/// and the ladder that results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollPlan {
    /// Strike whose straddle is bought back (closed).
    pub close: Strike,
    /// Strike where a new straddle is sold (opened).
    pub open: Strike,
    /// Ladder after the roll completes.
    pub next: Ladder,
}

impl Ladder {
    /// An empty, uninitiated ladder.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the ladder for an initiate transition around `center`:
    /// `{center - step, center, center + step}`.
    ///
    /// Overwrites whatever was tracked before; initiation is always allowed.
    #[must_use]
    pub fn initiate(center: Strike, step: u32) -> Self {
        Self {
            strikes: vec![center.down(step), center, center.up(step)],
        }
    }

    /// Reconstructs a ladder from strikes observed in live positions.
    ///
    /// # Errors
    /// Returns `LadderError::InvalidState` unless exactly three distinct
    /// strikes are supplied.
    pub fn from_observed(mut strikes: Vec<Strike>) -> Result<Self, LadderError> {
        strikes.sort_unstable();
        strikes.dedup();
        if strikes.len() != 3 {
            return Err(LadderError::InvalidState {
                tracked: strikes.len(),
            });
        }
        Ok(Self { strikes })
    }

    /// True when three strikes are tracked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.strikes.len() == 3
    }

    /// The tracked strikes, sorted ascending.
    #[must_use]
    pub fn strikes(&self) -> &[Strike] {
        &self.strikes
    }

    /// Low/mid/high accessors for an active ladder.
    fn edges(&self) -> Result<(Strike, Strike, Strike), LadderError> {
        match self.strikes[..] {
            [low, mid, high] => Ok((low, mid, high)),
            _ => Err(LadderError::InvalidState {
                tracked: self.strikes.len(),
            }),
        }
    }

    /// Plans a roll up: buy back the lowest straddle, sell one step above
    /// the highest. `{L,M,H}` becomes `{M,H,H+step}`.
    ///
    /// # Errors
    /// `LadderError::InvalidState` if the ladder is not active; the ladder
    /// is left untouched.
    pub fn roll_up_plan(&self, step: u32) -> Result<RollPlan, LadderError> {
        let (low, mid, high) = self.edges()?;
        let open = high.up(step);
        Ok(RollPlan {
            close: low,
            open,
            next: Self {
                strikes: vec![mid, high, open],
            },
        })
    }

    /// Plans a roll down: buy back the highest straddle, sell one step below
    /// the lowest. `{L,M,H}` becomes `{L-step,L,M}`.
    ///
    /// # Errors
    /// `LadderError::InvalidState` if the ladder is not active; the ladder
    /// is left untouched.
    pub fn roll_down_plan(&self, step: u32) -> Result<RollPlan, LadderError> {
        let (low, mid, high) = self.edges()?;
        let open = low.down(step);
        Ok(RollPlan {
            close: high,
            open,
            next: Self {
                strikes: vec![open, low, mid],
            },
        })
    }
}

impl std::fmt::Display for Ladder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.strikes.is_empty() {
            return f.write_str("(empty)");
        }
        let joined = self
            .strikes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> Ladder {
        Ladder::initiate(Strike(24850), 50)
    }

    #[test]
    fn initiate_centers_three_strikes_sorted() {
        let ladder = active();
        assert!(ladder.is_active());
        assert_eq!(
            ladder.strikes(),
            &[Strike(24800), Strike(24850), Strike(24900)]
        );
    }

    #[test]
    fn initiate_overwrites_prior_state() {
        // A fresh initiate ignores whatever was tracked before.
        let _old = active();
        let new = Ladder::initiate(Strike(25000), 50);
        assert_eq!(
            new.strikes(),
            &[Strike(24950), Strike(25000), Strike(25050)]
        );
    }

    #[test]
    fn roll_up_shifts_window_one_step() {
        let plan = active().roll_up_plan(50).unwrap();
        assert_eq!(plan.close, Strike(24800));
        assert_eq!(plan.open, Strike(24950));
        assert_eq!(
            plan.next.strikes(),
            &[Strike(24850), Strike(24900), Strike(24950)]
        );
    }

    #[test]
    fn roll_down_shifts_window_one_step() {
        let plan = active().roll_down_plan(50).unwrap();
        assert_eq!(plan.close, Strike(24900));
        assert_eq!(plan.open, Strike(24750));
        assert_eq!(
            plan.next.strikes(),
            &[Strike(24750), Strike(24800), Strike(24850)]
        );
    }

    #[test]
    fn rolls_fail_on_empty_ladder_without_mutation() {
        let ladder = Ladder::empty();
        assert_eq!(
            ladder.roll_up_plan(50),
            Err(LadderError::InvalidState { tracked: 0 })
        );
        assert_eq!(
            ladder.roll_down_plan(50),
            Err(LadderError::InvalidState { tracked: 0 })
        );
        assert_eq!(ladder, Ladder::empty());
    }

    #[test]
    fn repeated_rolls_keep_window_consistent() {
        let mut ladder = active();
        for _ in 0..4 {
            let plan = ladder.roll_up_plan(50).unwrap();
            ladder = plan.next;
        }
        assert_eq!(
            ladder.strikes(),
            &[Strike(25000), Strike(25050), Strike(25100)]
        );
        let s = ladder.strikes();
        assert_eq!(s[1].0 - s[0].0, 50);
        assert_eq!(s[2].0 - s[1].0, 50);
    }

    #[test]
    fn from_observed_requires_exactly_three_distinct() {
        let ok = Ladder::from_observed(vec![Strike(24900), Strike(24800), Strike(24850)]);
        assert_eq!(ok.unwrap(), active());

        let dup = Ladder::from_observed(vec![Strike(24800), Strike(24800), Strike(24850)]);
        assert_eq!(dup, Err(LadderError::InvalidState { tracked: 2 }));

        let four = Ladder::from_observed(vec![
            Strike(24750),
            Strike(24800),
            Strike(24850),
            Strike(24900),
        ]);
        assert_eq!(four, Err(LadderError::InvalidState { tracked: 4 }));
    }
}

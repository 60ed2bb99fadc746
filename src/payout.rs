//! Payout calculation.
//!
//! The one piece of domain logic this service owns: map an entry's
//! uniqueness and its parent game to a display-ready payout outcome.
//! Pure function of its inputs — no I/O, no clock, no hidden state. The
//! unique-answer count and the uniqueness verdict are settled by the
//! backend; this code only observes them.

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

use crate::types::{Game, Uniqueness};

/// Payout outcome for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Payout {
    /// Game not yet completed — payout is undefined until settlement.
    Pending,
    /// Game completed; the entry wins nothing.
    Zero,
    /// Game completed; the entry's share of the prize pool, rounded to
    /// two decimal places.
    Amount(Decimal),
}

/// The label the UI shows in the Winnings column.
impl fmt::Display for Payout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payout::Pending => write!(f, "Pending"),
            Payout::Zero => write!(f, "$0"),
            Payout::Amount(v) => write!(f, "${v:.2}"),
        }
    }
}

/// Compute the payout for one entry in its parent game.
///
/// Rules, in order:
/// 1. Game not `completed` → `Pending`, regardless of uniqueness.
/// 2. Entry not judged unique (including still undetermined) → `Zero`.
/// 3. Zero unique answers → `Zero` (guards division by zero).
/// 4. Otherwise → prize pool split evenly across unique answers.
///
/// Note: an undetermined entry in a completed game pays `Zero` here while
/// its uniqueness label still reads "Pending". That asymmetry matches the
/// shipped behavior.
pub fn payout(game: &Game, uniqueness: Uniqueness) -> Payout {
    if !game.is_completed() {
        return Payout::Pending;
    }
    if uniqueness != Uniqueness::Unique {
        return Payout::Zero;
    }
    let winners = game.unique_answer_count();
    if winners == 0 {
        return Payout::Zero;
    }
    let share = (game.prize_pool / Decimal::from(winners as u64))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Payout::Amount(share)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

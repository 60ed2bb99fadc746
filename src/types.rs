//! Shared types for the UniqueWager service.
//!
//! These types form the data model used across all modules. Games and
//! entries are owned by the hosted backend; this crate only reads them
//! (and writes exactly one thing: a new entry). They are designed to be
//! stable so that backend, payout, and server modules can depend on them
//! without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Lifecycle status of a game, as stored by the backend.
///
/// The backend stores lowercase strings; anything it grows in the future
/// deserialises to `Unknown`, which behaves as "not completed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Pending,
    Active,
    Completed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Pending => write!(f, "pending"),
            GameStatus::Active => write!(f, "active"),
            GameStatus::Completed => write!(f, "completed"),
            GameStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for GameStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "draft" | "scheduled" => Ok(GameStatus::Pending),
            "active" | "open" => Ok(GameStatus::Active),
            "completed" | "settled" | "closed" => Ok(GameStatus::Completed),
            _ => Err(anyhow::anyhow!("Unknown game status: {s}")),
        }
    }
}

/// One betting round: a question, a prize pool, a lifecycle status, and
/// (once settled) the set of answers the backend judged unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub question: String,
    /// Total prize pool in USD. Split evenly among unique answers at
    /// settlement.
    pub prize_pool: Decimal,
    pub status: GameStatus,
    /// Answers judged unique at settlement time. Populated by the backend
    /// when the game transitions to `completed`; empty before that. Only
    /// its length feeds the payout.
    #[serde(default)]
    pub common_answers: Vec<String>,
}

impl Game {
    /// Number of unique answers as settled by the backend.
    pub fn unique_answer_count(&self) -> usize {
        self.common_answers.len()
    }

    /// Whether this game has been settled.
    pub fn is_completed(&self) -> bool {
        self.status == GameStatus::Completed
    }

    /// Helper to build a sample game with sensible defaults.
    #[cfg(test)]
    pub fn sample(status: GameStatus) -> Self {
        use rust_decimal_macros::dec;
        Game {
            id: uuid::Uuid::new_v4().to_string(),
            question: "Name a word nobody else will think of".to_string(),
            prize_pool: dec!(100),
            status,
            common_answers: Vec::new(),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (pool: ${} | unique: {})",
            self.status,
            self.question,
            self.prize_pool,
            self.unique_answer_count(),
        )
    }
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

/// Whether an entry's answer was judged unique.
///
/// The backend stores this as a nullable boolean: null until settlement,
/// then true/false. Modelled as three variants so the undetermined state
/// can't be conflated with "not unique" by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Uniqueness {
    Unique,
    NotUnique,
    Undetermined,
}

impl From<Option<bool>> for Uniqueness {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Uniqueness::Unique,
            Some(false) => Uniqueness::NotUnique,
            None => Uniqueness::Undetermined,
        }
    }
}

/// The label the UI shows in the Uniqueness column.
impl fmt::Display for Uniqueness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uniqueness::Unique => write!(f, "✨ Unique"),
            Uniqueness::NotUnique => write!(f, "Not Unique"),
            Uniqueness::Undetermined => write!(f, "Pending"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One user's submitted answer for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub game_id: String,
    pub user_id: String,
    pub answer: String,
    pub uniqueness: Uniqueness,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.answer, self.uniqueness)
    }
}

impl Entry {
    #[cfg(test)]
    pub fn sample(game_id: &str, uniqueness: Uniqueness) -> Self {
        Entry {
            id: uuid::Uuid::new_v4().to_string(),
            game_id: game_id.to_string(),
            user_id: uuid::Uuid::new_v4().to_string(),
            answer: "zephyr".to_string(),
            uniqueness,
            created_at: Utc::now(),
        }
    }
}

/// An entry joined with its parent game's settlement-relevant fields —
/// the row shape of the user's game history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayedGame {
    pub entry: Entry,
    pub game: Game,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated user's session, as issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the access token has expired (false when no expiry is known).
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => at <= Utc::now(),
            None => false,
        }
    }

    #[cfg(test)]
    pub fn sample() -> Self {
        Session {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: "player@example.com".to_string(),
            access_token: "test-token".to_string(),
            refresh_token: None,
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.email, self.user_id)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for UniqueWager.
///
/// Upstream failures are reported unchanged; nothing here retries or
/// recovers. The payout computation itself is total and never appears in
/// this taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum WagerError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error("Answer must not be empty")]
    EmptyAnswer,

    #[error("No active game")]
    NoActiveGame,

    #[error("Game not found: {0}")]
    GameNotFound(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

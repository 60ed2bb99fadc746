//! REST row-store client (PostgREST-style API).
//!
//! Reads `games` and `entries` rows and inserts new entries over the
//! hosted backend's row API. The history join uses PostgREST embedded
//! resources so one request returns each entry with its parent game's
//! settlement fields.
//!
//! Auth: every request carries the project API key; user-scoped requests
//! additionally use the session's access token as the bearer so the
//! backend's row-level policies apply.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use super::{Result, WagerStore};
use crate::types::{Entry, Game, GameStatus, PlayedGame, Session, WagerError};

const STORE_NAME: &str = "rest";

// ---------------------------------------------------------------------------
// Wire row types (backend JSON → Rust)
// ---------------------------------------------------------------------------

/// A `games` row. We only deserialize the fields we need.
#[derive(Debug, Deserialize)]
struct GameRow {
    id: String,
    question: String,
    prize_pool: Decimal,
    status: GameStatus,
    /// Null until the backend settles the game.
    #[serde(default)]
    common_answers: Option<Vec<String>>,
}

impl GameRow {
    fn into_game(self) -> Game {
        Game {
            id: self.id,
            question: self.question,
            prize_pool: self.prize_pool,
            status: self.status,
            common_answers: self.common_answers.unwrap_or_default(),
        }
    }
}

/// An `entries` row.
#[derive(Debug, Deserialize)]
struct EntryRow {
    id: String,
    game_id: String,
    user_id: String,
    answer: String,
    /// Nullable: null until settlement, then true/false.
    #[serde(default)]
    is_unique: Option<bool>,
    created_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self) -> Entry {
        Entry {
            id: self.id,
            game_id: self.game_id,
            user_id: self.user_id,
            answer: self.answer,
            uniqueness: self.is_unique.into(),
            created_at: self.created_at,
        }
    }
}

/// An `entries` row with its parent game embedded (history join shape).
#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(flatten)]
    entry: EntryRow,
    games: GameJoin,
}

/// The parent-game fields the history join selects.
#[derive(Debug, Deserialize)]
struct GameJoin {
    question: String,
    prize_pool: Decimal,
    status: GameStatus,
    #[serde(default)]
    common_answers: Option<Vec<String>>,
}

impl HistoryRow {
    fn into_played_game(self) -> PlayedGame {
        let game = Game {
            id: self.entry.game_id.clone(),
            question: self.games.question,
            prize_pool: self.games.prize_pool,
            status: self.games.status,
            common_answers: self.games.common_answers.unwrap_or_default(),
        };
        PlayedGame {
            entry: self.entry.into_entry(),
            game,
        }
    }
}

/// Insert body for a new entry.
#[derive(Debug, Serialize)]
struct NewEntryRow<'a> {
    game_id: &'a str,
    user_id: &'a str,
    answer: &'a str,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Row-store client against the hosted backend's REST API.
pub struct RestStore {
    http: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl RestStore {
    /// Create a new store client for the given project.
    pub fn new(base_url: &str, api_key: Secret<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("uniquewager/0.1.0")
            .build()
            .context("Failed to build HTTP client for row store")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    // -- Internal helpers ------------------------------------------------

    /// GET rows from a `/rest/v1/...` path+query, deserialized as a list.
    ///
    /// `bearer` is the session access token for user-scoped reads, or None
    /// for public reads (the API key is used as bearer in that case).
    async fn get_rows<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        bearer: Option<&str>,
    ) -> Result<Vec<T>> {
        let url = format!("{}/rest/v1/{path_and_query}", self.base_url);
        debug!(url = %url, "Fetching rows");

        let token = bearer.unwrap_or_else(|| self.api_key.expose_secret().as_str());
        let resp = self
            .http
            .get(&url)
            .header("apikey", self.api_key.expose_secret())
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .map_err(|err| WagerError::Store(format!("Row store request failed: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(WagerError::Store(format!("Row store error {status}: {body}")));
        }

        let rows: Vec<T> = resp
            .json()
            .await
            .map_err(|err| WagerError::Store(format!("Failed to parse row store response: {err}")))?;

        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// WagerStore trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl WagerStore for RestStore {
    async fn active_game(&self) -> Result<Option<Game>> {
        let rows: Vec<GameRow> = self
            .get_rows("games?select=*&status=eq.active&limit=1", None)
            .await?;

        Ok(rows.into_iter().next().map(GameRow::into_game))
    }

    async fn entries_for_game(&self, game_id: &str, session: &Session) -> Result<Vec<Entry>> {
        let query = format!(
            "entries?select=*&game_id=eq.{}&user_id=eq.{}&order=created_at.desc",
            urlencoding::encode(game_id),
            urlencoding::encode(&session.user_id),
        );
        let rows: Vec<EntryRow> = self.get_rows(&query, Some(&session.access_token)).await?;

        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn game_history(&self, session: &Session) -> Result<Vec<PlayedGame>> {
        let query = format!(
            "entries?select=*,games:game_id(question,prize_pool,status,common_answers)\
             &user_id=eq.{}&order=created_at.desc",
            urlencoding::encode(&session.user_id),
        );
        let rows: Vec<HistoryRow> = self.get_rows(&query, Some(&session.access_token)).await?;

        Ok(rows.into_iter().map(HistoryRow::into_played_game).collect())
    }

    async fn submit_entry(
        &self,
        game_id: &str,
        answer: &str,
        session: &Session,
    ) -> Result<Entry> {
        let url = format!("{}/rest/v1/entries", self.base_url);
        let body = NewEntryRow {
            game_id,
            user_id: &session.user_id,
            answer,
        };

        let resp = self
            .http
            .post(&url)
            .header("apikey", self.api_key.expose_secret())
            .header("Authorization", format!("Bearer {}", session.access_token))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(|err| WagerError::Store(format!("Entry insert request failed: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(WagerError::Store(format!("Entry insert failed {status}: {body}")));
        }

        // return=representation answers with the inserted rows as a list.
        let rows: Vec<EntryRow> = resp
            .json()
            .await
            .map_err(|err| WagerError::Store(format!("Failed to parse entry insert response: {err}")))?;

        let entry = rows
            .into_iter()
            .next()
            .ok_or_else(|| WagerError::Store("Entry insert returned no row".to_string()))?
            .into_entry();

        info!(
            entry_id = %entry.id,
            game_id = %entry.game_id,
            user_id = %entry.user_id,
            "Entry submitted"
        );

        Ok(entry)
    }

    fn name(&self) -> &str {
        STORE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

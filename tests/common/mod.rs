//! In-memory backend for integration testing.
//!
//! Provides deterministic `WagerStore` and `AuthGateway` implementations
//! that hold games, entries, users, and tokens in memory with no external
//! dependencies. Fully controllable from test code.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use uniquewager::backend::{AuthGateway, Result, WagerStore};
use uniquewager::types::*;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// An in-memory row store for deterministic testing.
pub struct MemoryStore {
    games: Mutex<Vec<Game>>,
    entries: Mutex<Vec<Entry>>,
    /// If set, all operations will return this error.
    force_error: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new(games: Vec<Game>) -> Arc<Self> {
        Arc::new(Self {
            games: Mutex::new(games),
            entries: Mutex::new(Vec::new()),
            force_error: Mutex::new(None),
        })
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Seed an already-settled entry, as the backend would have written it.
    pub fn seed_entry(
        &self,
        game_id: &str,
        user_id: &str,
        answer: &str,
        is_unique: Option<bool>,
        age: Duration,
    ) {
        self.entries.lock().unwrap().push(Entry {
            id: Uuid::new_v4().to_string(),
            game_id: game_id.to_string(),
            user_id: user_id.to_string(),
            answer: answer.to_string(),
            uniqueness: is_unique.into(),
            created_at: Utc::now() - age,
        });
    }

    fn check_error(&self) -> Result<()> {
        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(WagerError::Store(msg.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl WagerStore for MemoryStore {
    async fn active_game(&self) -> Result<Option<Game>> {
        self.check_error()?;
        Ok(self
            .games
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.status == GameStatus::Active)
            .cloned())
    }

    async fn entries_for_game(&self, game_id: &str, session: &Session) -> Result<Vec<Entry>> {
        self.check_error()?;
        let mut entries: Vec<Entry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.game_id == game_id && e.user_id == session.user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn game_history(&self, session: &Session) -> Result<Vec<PlayedGame>> {
        self.check_error()?;
        let games = self.games.lock().unwrap();
        let mut rows: Vec<PlayedGame> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == session.user_id)
            .filter_map(|e| {
                games
                    .iter()
                    .find(|g| g.id == e.game_id)
                    .map(|g| PlayedGame {
                        entry: e.clone(),
                        game: g.clone(),
                    })
            })
            .collect();
        rows.sort_by(|a, b| b.entry.created_at.cmp(&a.entry.created_at));
        Ok(rows)
    }

    async fn submit_entry(
        &self,
        game_id: &str,
        answer: &str,
        session: &Session,
    ) -> Result<Entry> {
        self.check_error()?;
        let entry = Entry {
            id: Uuid::new_v4().to_string(),
            game_id: game_id.to_string(),
            user_id: session.user_id.clone(),
            answer: answer.to_string(),
            uniqueness: Uniqueness::Undetermined,
            created_at: Utc::now(),
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// An in-memory auth service: registered users and issued tokens.
pub struct MemoryAuth {
    /// email → (password, user_id)
    users: Mutex<HashMap<String, (String, String)>>,
    /// access_token → (user_id, email)
    tokens: Mutex<HashMap<String, (String, String)>>,
}

impl MemoryAuth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
        })
    }

    fn issue(&self, user_id: &str, email: &str) -> Session {
        let token = Uuid::new_v4().to_string();
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), (user_id.to_string(), email.to_string()));
        Session {
            user_id: user_id.to_string(),
            email: email.to_string(),
            access_token: token,
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }
}

#[async_trait]
impl AuthGateway for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let user_id = Uuid::new_v4().to_string();
        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(WagerError::Auth(format!("User already registered: {email}")));
        }
        users.insert(email.to_string(), (password.to_string(), user_id.clone()));
        drop(users);
        Ok(self.issue(&user_id, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let users = self.users.lock().unwrap();
        let (stored, user_id) = users
            .get(email)
            .ok_or_else(|| WagerError::Auth(format!("Unknown user: {email}")))?;
        if stored != password {
            return Err(WagerError::Auth("Invalid credentials".to_string()));
        }
        let user_id = user_id.clone();
        drop(users);
        Ok(self.issue(&user_id, email))
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        self.tokens.lock().unwrap().remove(&session.access_token);
        Ok(())
    }

    async fn session_from_token(&self, access_token: &str) -> Result<Session> {
        let tokens = self.tokens.lock().unwrap();
        let (user_id, email) = tokens
            .get(access_token)
            .ok_or_else(|| WagerError::Auth("Unknown or revoked token".to_string()))?;
        Ok(Session {
            user_id: user_id.clone(),
            email: email.clone(),
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
        })
    }
}

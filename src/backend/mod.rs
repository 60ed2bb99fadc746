//! Hosted backend integrations.
//!
//! Defines the `WagerStore` and `AuthGateway` traits — the boundary to the
//! external service that owns every row and every state transition — and
//! provides a REST implementation against a Supabase-style API (PostgREST
//! rows + GoTrue auth).
//!
//! The service never writes to `games` and never decides uniqueness. Its
//! only write is inserting a new entry; the backend settles everything
//! else asynchronously.

pub mod auth;
pub mod rest;

use async_trait::async_trait;

use crate::types::{Entry, Game, PlayedGame, Session, WagerError};

/// Gateway results carry the domain error taxonomy: `WagerError::Store`
/// for row-store failures, `WagerError::Auth` for auth-service rejections.
pub type Result<T> = std::result::Result<T, WagerError>;

/// Abstraction over the wagering row store.
///
/// Implementors provide game lookup, entry reads scoped to the calling
/// user's session, and the single entry-creation write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WagerStore: Send + Sync {
    /// Fetch the currently open game, if any. At most one game is active
    /// at a time.
    async fn active_game(&self) -> Result<Option<Game>>;

    /// Fetch the session user's entries for one game.
    async fn entries_for_game(&self, game_id: &str, session: &Session) -> Result<Vec<Entry>>;

    /// Fetch the session user's full game history: each entry joined with
    /// its parent game, newest first by creation time.
    async fn game_history(&self, session: &Session) -> Result<Vec<PlayedGame>>;

    /// Create one entry with the given (already trimmed, non-empty) answer.
    /// Uniqueness determination happens in the backend, asynchronously.
    async fn submit_entry(&self, game_id: &str, answer: &str, session: &Session)
        -> Result<Entry>;

    /// Store name for logging and identification.
    fn name(&self) -> &str;
}

/// Abstraction over the auth service.
///
/// The rest of the service only cares about "is a user authenticated, and
/// what is their identifier" — all credential handling lives behind this.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Register a new user and return their session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    /// Authenticate with email + password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Revoke the session's tokens.
    async fn sign_out(&self, session: &Session) -> Result<()>;

    /// Resolve a bearer access token to the session it identifies.
    async fn session_from_token(&self, access_token: &str) -> Result<Session>;
}

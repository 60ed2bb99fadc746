//! API route handlers.
//!
//! All endpoints return JSON. Gateways are shared via `Arc<AppContext>`.
//! Handlers stay thin: parse the bearer token, resolve the session, call
//! the gateway, map errors to status codes. The winnings column of the
//! history response is the only place domain logic runs — see
//! `crate::payout`.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{AuthGateway, WagerStore};
use crate::payout::payout;
use crate::types::{Entry, Game, PlayedGame, Session, WagerError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Gateways shared by all route handlers.
pub struct AppContext {
    pub store: Arc<dyn WagerStore>,
    pub auth: Arc<dyn AuthGateway>,
}

pub type AppState = Arc<AppContext>;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// An error ready to be returned to the HTTP client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authorized")
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

/// Default status mapping for the domain error taxonomy. Handlers override
/// this where the endpoint knows better (sign-in turns `Auth` into 401,
/// sign-up into 422).
impl From<WagerError> for ApiError {
    fn from(err: WagerError) -> Self {
        match err {
            WagerError::Store(_) => {
                // Upstream failures are reported unchanged, never retried here.
                warn!(error = %err, "Backend call failed");
                Self::new(StatusCode::BAD_GATEWAY, "Backend unavailable")
            }
            WagerError::Auth(_) | WagerError::Unauthorized => Self::unauthorized(),
            WagerError::EmptyAnswer => Self::unprocessable(err.to_string()),
            WagerError::NoActiveGame | WagerError::GameNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionBody {
    fn from(s: Session) -> Self {
        Self {
            user_id: s.user_id,
            email: s.email,
            access_token: s.access_token,
            refresh_token: s.refresh_token,
            expires_at: s.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameBody {
    pub id: String,
    pub question: String,
    pub prize_pool: Decimal,
    pub status: String,
}

impl From<Game> for GameBody {
    fn from(g: Game) -> Self {
        Self {
            id: g.id,
            question: g.question,
            prize_pool: g.prize_pool,
            status: g.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryBody {
    pub id: String,
    pub answer: String,
    /// Display label: "✨ Unique" / "Not Unique" / "Pending".
    pub uniqueness: String,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryBody {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            answer: e.answer,
            uniqueness: e.uniqueness.to_string(),
            created_at: e.created_at,
        }
    }
}

/// One row of the game-history table, winnings included.
#[derive(Debug, Serialize)]
pub struct HistoryRowBody {
    pub question: String,
    pub answer: String,
    pub game_status: String,
    pub uniqueness: String,
    /// Display label: "Pending", "$0", or "$<share>".
    pub winnings: String,
    pub created_at: DateTime<Utc>,
}

impl From<PlayedGame> for HistoryRowBody {
    fn from(played: PlayedGame) -> Self {
        let winnings = payout(&played.game, played.entry.uniqueness).to_string();
        Self {
            question: played.game.question,
            answer: played.entry.answer,
            game_status: played.game.status.to_string(),
            uniqueness: played.entry.uniqueness.to_string(),
            winnings,
            created_at: played.entry.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    pub game_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NewEntryBody {
    pub game_id: String,
    pub answer: String,
}

// ---------------------------------------------------------------------------
// Bearer-token helpers
// ---------------------------------------------------------------------------

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::unauthorized)
}

/// Resolve the caller's bearer token to a live session.
async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let token = bearer_token(headers)?;
    let session = state
        .auth
        .session_from_token(token)
        .await
        .map_err(|err| match err {
            WagerError::Auth(_) | WagerError::Unauthorized => {
                warn!(error = %err, "Bearer token rejected");
                ApiError::unauthorized()
            }
            other => other.into(),
        })?;

    if session.is_expired() {
        warn!(user_id = %session.user_id, "Session expired");
        return Err(ApiError::unauthorized());
    }

    Ok(session)
}

// ---------------------------------------------------------------------------
// Auth handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<(StatusCode, Json<SessionBody>), ApiError> {
    validate_credentials(&creds)?;
    let session = state
        .auth
        .sign_up(&creds.email, &creds.password)
        .await
        .map_err(|err| match err {
            // Rejected registration (duplicate email, weak password) is the
            // caller's problem, not an upstream outage.
            WagerError::Auth(message) => {
                warn!(email = %creds.email, %message, "Sign-up rejected");
                ApiError::unprocessable(message)
            }
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<Json<SessionBody>, ApiError> {
    validate_credentials(&creds)?;
    let session = state
        .auth
        .sign_in(&creds.email, &creds.password)
        .await
        .map_err(|err| match err {
            WagerError::Auth(_) => {
                warn!(email = %creds.email, error = %err, "Sign-in failed");
                ApiError::unauthorized()
            }
            other => other.into(),
        })?;
    Ok(Json(session.into()))
}

/// POST /api/auth/signout
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = require_session(&state, &headers).await?;
    state.auth.sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_credentials(creds: &Credentials) -> Result<(), ApiError> {
    if creds.email.trim().is_empty() || creds.password.is_empty() {
        return Err(ApiError::unprocessable("Email and password are required"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Game handlers
// ---------------------------------------------------------------------------

/// GET /api/game — the currently open game, or null.
pub async fn get_active_game(
    State(state): State<AppState>,
) -> Result<Json<Option<GameBody>>, ApiError> {
    let game = state.store.active_game().await?;
    Ok(Json(game.map(GameBody::from)))
}

/// GET /api/entries?game_id=… — the caller's entries for one game.
pub async fn get_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EntriesQuery>,
) -> Result<Json<Vec<EntryBody>>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let entries = state.store.entries_for_game(&query.game_id, &session).await?;
    Ok(Json(entries.into_iter().map(EntryBody::from).collect()))
}

/// POST /api/entries — submit an answer for the active game.
pub async fn submit_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewEntryBody>,
) -> Result<(StatusCode, Json<EntryBody>), ApiError> {
    let session = require_session(&state, &headers).await?;

    let answer = body.answer.trim();
    if answer.is_empty() {
        return Err(WagerError::EmptyAnswer.into());
    }

    // Only the open game accepts entries; the game id must match it.
    let active = state
        .store
        .active_game()
        .await?
        .ok_or(WagerError::NoActiveGame)?;

    if active.id != body.game_id {
        return Err(WagerError::GameNotFound(body.game_id).into());
    }

    let entry = state.store.submit_entry(&active.id, answer, &session).await?;

    info!(
        entry_id = %entry.id,
        game_id = %entry.game_id,
        user_id = %session.user_id,
        "Answer recorded"
    );

    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// GET /api/history — the caller's played games with computed winnings.
pub async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<HistoryRowBody>>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let history = state.store.game_history(&session).await?;
    Ok(Json(history.into_iter().map(HistoryRowBody::from).collect()))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use super::errors::RouteError;
use super::state::ServerState;
use crate::store::{FullStore, StoreResult};
use crate::user::auth::AuthTokenValue;
use crate::user::Role;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::HeaderMap, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

/// The authenticated user behind a request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: i64,
    pub email: String,
    /// `None` if the stored role string isn't a known role.
    pub role: Option<Role>,
    pub token: AuthTokenValue,
}

fn extract_session_token_from_cookies(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn extract_session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(HEADER_SESSION_TOKEN_KEY)?;
    let value = String::from_utf8_lossy(value.as_bytes());
    let token = value.strip_prefix("Bearer ").unwrap_or(&value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolves the session token carried by the request, if any, and marks it
/// as used.
pub fn resolve_actor(headers: &HeaderMap, store: &dyn FullStore) -> StoreResult<Option<Actor>> {
    let token = match extract_session_token_from_cookies(headers)
        .or_else(|| extract_session_token_from_headers(headers))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return Ok(None);
        }
        Some(x) => AuthTokenValue(x),
    };

    let session_user = match store.resolve_session(&token)? {
        Some(user) => user,
        None => {
            debug!("Session token not found in database");
            return Ok(None);
        }
    };
    debug!("Found session for user_id={}", session_user.user_id);

    if let Err(e) = store.touch_session(&token) {
        // Not critical for authentication
        debug!("Failed to update session last_used timestamp: {}", e);
    }

    Ok(Some(Actor {
        user_id: session_user.user_id,
        role: Role::from_str(&session_user.role_type),
        email: session_user.email,
        token,
    }))
}

async fn actor_from_parts(parts: &Parts, state: &ServerState) -> Result<Option<Actor>, RouteError> {
    // Already resolved by the guard layer
    if let Some(actor) = parts.extensions.get::<Actor>() {
        return Ok(Some(actor.clone()));
    }
    Ok(resolve_actor(&parts.headers, state.store.as_ref())?)
}

impl FromRequestParts<ServerState> for Actor {
    type Rejection = RouteError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        actor_from_parts(parts, state)
            .await?
            .ok_or(RouteError::AuthenticationRequired)
    }
}

impl OptionalFromRequestParts<ServerState> for Actor {
    type Rejection = RouteError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        actor_from_parts(parts, state).await
    }
}

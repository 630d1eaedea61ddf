use auth::AuthError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::SignedCookieJar;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Name of the signed cookie carrying the token issued at login.
pub const SESSION_COOKIE: &str = "session_token";

/// Body of every 401 produced here; the rejection reason is only logged.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing token";

/// Extension type to store the authenticated username in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Middleware that validates the JWT and adds the subject to request extensions.
///
/// The token is read from `Authorization: Bearer <token>` first, then from the signed
/// session cookie. Every request is verified again; nothing is cached.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .map(str::to_string)
        .or_else(|| session_token(&jar));

    let username = token
        .ok_or(AuthError::Missing)
        .and_then(|token| state.authenticator.validate_token(&token))
        .map_err(|reason| {
            tracing::warn!(
                reason = ?reason,
                method = %req.method(),
                uri = %req.uri(),
                "Request rejected by auth gate"
            );
            ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
        })?;

    req.extensions_mut().insert(AuthenticatedUser { username });

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// Cookies with a bad signature never come out of the jar.
fn session_token(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

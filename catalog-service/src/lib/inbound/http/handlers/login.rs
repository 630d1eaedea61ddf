use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::SignedCookieJar;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::CredentialsRequest;
use super::INVALID_CREDENTIALS_MESSAGE;
use crate::account::errors::UsernameError;
use crate::account::models::LoginCommand;
use crate::account::models::Password;
use crate::account::models::Username;
use crate::inbound::http::middleware::SESSION_COOKIE;
use crate::inbound::http::router::AppState;

/// Verify credentials, answer with the token and store it in the signed session cookie.
///
/// # Errors
/// * 400 - Username or password absent
/// * 401 - Unknown username or wrong password; the two are indistinguishable
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, ApiSuccess<LoginResponseData>), ApiError> {
    let Json(body) = body?;

    // A malformed username cannot belong to an account.
    let username = match Username::new(body.username.unwrap_or_default()) {
        Ok(username) => username,
        Err(UsernameError::Missing) => {
            return Err(ApiError::BadRequest(UsernameError::Missing.to_string()))
        }
        Err(_) => {
            return Err(ApiError::Unauthorized(
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ))
        }
    };
    let password = Password::new(body.password.unwrap_or_default())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let access = state
        .account_service
        .login(LoginCommand::new(username, password))
        .await?;

    let max_age = state.authenticator.token_validity().num_seconds();
    let cookie = Cookie::build((SESSION_COOKIE, access.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookie)
        .max_age(time::Duration::seconds(max_age));

    Ok((
        jar.add(cookie),
        ApiSuccess::new(
            StatusCode::OK,
            LoginResponseData {
                token: access.token,
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
}

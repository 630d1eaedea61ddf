pub mod authors;
pub mod books;
pub mod login;
pub mod register;
pub mod search;

use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::account::errors::AccountError;
use crate::account::errors::PasswordError;
use crate::account::errors::UsernameError;
use crate::account::models::Password;
use crate::account::models::Username;
use crate::catalog::errors::CatalogError;
use crate::catalog::models::Author;
use crate::catalog::models::Book;
use crate::inbound::http::negotiation::SerializationError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Standardized API success response; the payload is the body.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl ApiError {
    /// Log the detail and answer with a message that carries none of it.
    fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed");
        ApiError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<SerializationError> for ApiError {
    fn from(err: SerializationError) -> Self {
        ApiError::internal(err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidUsername(_) | AccountError::InvalidPassword(_) => {
                ApiError::BadRequest(err.to_string())
            }
            AccountError::UsernameAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            AccountError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            AccountError::Hashing(_)
            | AccountError::TokenIssuance(_)
            | AccountError::DatabaseError(_)
            | AccountError::Unknown(_) => ApiError::internal(err),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidTitle(_)
            | CatalogError::InvalidGenre(_)
            | CatalogError::InvalidCopies(_)
            | CatalogError::InvalidAuthorName(_)
            | CatalogError::InvalidSearchTerm(_)
            | CatalogError::EmptyUpdate
            | CatalogError::UnknownAuthor(_) => ApiError::BadRequest(err.to_string()),
            CatalogError::BookNotFound(_) => ApiError::NotFound(err.to_string()),
            CatalogError::DatabaseError(_) | CatalogError::Unknown(_) => ApiError::internal(err),
        }
    }
}

/// Request body shared by registration and login. Absent fields are validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseCredentialsError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordError),
}

impl From<ParseCredentialsError> for ApiError {
    fn from(err: ParseCredentialsError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl CredentialsRequest {
    fn parse(self) -> Result<(Username, Password), ParseCredentialsError> {
        let username = Username::new(self.username.unwrap_or_default())?;
        let password = Password::new(self.password.unwrap_or_default())?;
        Ok((username, password))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookData {
    pub book_id: i64,
    pub title: String,
    pub author_id: i64,
    pub author: String,
    pub genre: Option<String>,
    pub publish_year: Option<i32>,
    pub available_copies: i32,
    pub date_added: NaiveDate,
}

impl From<&Book> for BookData {
    fn from(book: &Book) -> Self {
        Self {
            book_id: book.id.0,
            title: book.title.clone(),
            author_id: book.author_id.0,
            author: book.author.clone(),
            genre: book.genre.clone(),
            publish_year: book.publish_year,
            available_copies: book.available_copies,
            date_added: book.date_added,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorData {
    pub author_id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Author> for AuthorData {
    fn from(author: &Author) -> Self {
        Self {
            author_id: author.id.0,
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::errors::SearchTermError;
    use crate::catalog::models::AuthorId;
    use crate::catalog::models::BookId;

    #[test]
    fn test_account_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(AccountError::UsernameAlreadyExists("alice".to_string())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AccountError::InvalidUsername(UsernameError::Missing)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AccountError::InvalidCredentials),
            ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_catalog_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(CatalogError::BookNotFound(BookId(3))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CatalogError::UnknownAuthor(AuthorId(9))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CatalogError::EmptyUpdate).status(),
            StatusCode::BAD_REQUEST
        );
        assert!(matches!(
            ApiError::from(CatalogError::InvalidSearchTerm(SearchTermError::Empty)),
            ApiError::BadRequest(msg) if msg.contains("Search term must not be empty")
        ));
    }

    #[test]
    fn test_store_errors_are_sanitized() {
        let err = ApiError::from(CatalogError::DatabaseError(
            "relation \"books\" does not exist".to_string(),
        ));
        assert_eq!(
            err,
            ApiError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
        );

        let err = ApiError::from(AccountError::DatabaseError("connection refused".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_credentials_request_requires_both_fields() {
        let missing_password = CredentialsRequest {
            username: Some("alice".to_string()),
            password: None,
        };
        assert!(matches!(
            missing_password.parse(),
            Err(ParseCredentialsError::Password(PasswordError::Missing))
        ));

        assert!(matches!(
            CredentialsRequest::default().parse(),
            Err(ParseCredentialsError::Username(UsernameError::Missing))
        ));

        let (username, password) = CredentialsRequest {
            username: Some("alice".to_string()),
            password: Some("pw123".to_string()),
        }
        .parse()
        .unwrap();
        assert_eq!(username.as_str(), "alice");
        assert_eq!(password.expose(), "pw123");
    }
}

use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::BookData;
use super::MessageData;
use crate::catalog::errors::CatalogError;
use crate::catalog::models::AuthorId;
use crate::catalog::models::BookId;
use crate::catalog::models::BookTitle;
use crate::catalog::models::BookUpdate;
use crate::catalog::models::Copies;
use crate::catalog::models::Genre;
use crate::catalog::models::NewBook;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::negotiation::Negotiated;
use crate::inbound::http::negotiation::ResponseFormat;
use crate::inbound::http::router::AppState;

pub const BOOKS_ROOT: &str = "books";

pub async fn list_books(
    State(state): State<AppState>,
    format: ResponseFormat,
) -> Result<Negotiated, ApiError> {
    let books = state.catalog_service.list_books().await?;
    let data: Vec<BookData> = books.iter().map(BookData::from).collect();

    Ok(Negotiated::collection(format, BOOKS_ROOT, &data)?)
}

pub async fn get_book(
    State(state): State<AppState>,
    format: ResponseFormat,
    book_id: Result<Path<i64>, PathRejection>,
) -> Result<Negotiated, ApiError> {
    let Path(book_id) = book_id?;

    let book = state.catalog_service.get_book(BookId(book_id)).await?;

    Ok(Negotiated::record(format, BOOKS_ROOT, &BookData::from(&book))?)
}

pub async fn create_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<ApiSuccess<BookCreatedData>, ApiError> {
    let Json(body) = body?;

    let book_id = state
        .catalog_service
        .add_book(body.try_into_new_book()?)
        .await?;
    tracing::debug!(book_id = %book_id, username = %user.username, "Book created via http");

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        BookCreatedData {
            message: "Book added".to_string(),
            book_id: book_id.0,
        },
    ))
}

pub async fn update_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    book_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let Path(book_id) = book_id?;
    let Json(body) = body?;

    state
        .catalog_service
        .update_book(BookId(book_id), body.try_into_update()?)
        .await?;
    tracing::debug!(book_id, username = %user.username, "Book updated via http");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Book updated"),
    ))
}

/// Answers 200 whether or not the book existed.
pub async fn delete_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    book_id: Result<Path<i64>, PathRejection>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let Path(book_id) = book_id?;

    state.catalog_service.remove_book(BookId(book_id)).await?;
    tracing::debug!(book_id, username = %user.username, "Book deleted via http");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Book deleted"),
    ))
}

/// HTTP request body for adding a book (raw JSON)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookRequest {
    title: Option<String>,
    author_id: Option<i64>,
    genre: Option<String>,
    publish_year: Option<i32>,
    available_copies: Option<i32>,
}

impl CreateBookRequest {
    fn try_into_new_book(self) -> Result<NewBook, ApiError> {
        let title = BookTitle::new(self.title.unwrap_or_default()).map_err(CatalogError::from)?;
        let author_id = self
            .author_id
            .map(AuthorId)
            .ok_or_else(|| ApiError::BadRequest("Author id is required".to_string()))?;
        let available_copies =
            Copies::new(self.available_copies.unwrap_or(0)).map_err(CatalogError::from)?;

        Ok(NewBook {
            title,
            author_id,
            genre: optional_genre(self.genre)?,
            publish_year: self.publish_year,
            available_copies,
        })
    }
}

/// HTTP request body for a partial book update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookRequest {
    title: Option<String>,
    author_id: Option<i64>,
    genre: Option<String>,
    publish_year: Option<i32>,
    available_copies: Option<i32>,
}

impl UpdateBookRequest {
    fn try_into_update(self) -> Result<BookUpdate, CatalogError> {
        Ok(BookUpdate {
            title: self.title.map(BookTitle::new).transpose()?,
            author_id: self.author_id.map(AuthorId),
            genre: optional_genre(self.genre)?,
            publish_year: self.publish_year,
            available_copies: self.available_copies.map(Copies::new).transpose()?,
        })
    }
}

/// A blank genre is treated as absent.
fn optional_genre(value: Option<String>) -> Result<Option<Genre>, CatalogError> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    Ok(Some(Genre::new(value)?))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookCreatedData {
    pub message: String,
    pub book_id: i64,
}

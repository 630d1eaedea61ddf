use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::extract::State;
use serde::Deserialize;

use super::ApiError;
use super::BookData;
use crate::catalog::errors::CatalogError;
use crate::catalog::models::SearchTerm;
use crate::inbound::http::handlers::books::BOOKS_ROOT;
use crate::inbound::http::negotiation::Negotiated;
use crate::inbound::http::negotiation::ResponseFormat;
use crate::inbound::http::router::AppState;

/// Case-insensitive substring search over title and genre.
///
/// # Errors
/// * 400 - `q` is absent, blank or repeated; the full collection is never returned instead
pub async fn search_books(
    State(state): State<AppState>,
    format: ResponseFormat,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Negotiated, ApiError> {
    let Query(params) = params?;
    let term = SearchTerm::new(params.q.unwrap_or_default()).map_err(CatalogError::from)?;

    let books = state.catalog_service.search_books(&term).await?;
    let data: Vec<BookData> = books.iter().map(BookData::from).collect();

    Ok(Negotiated::collection(format, BOOKS_ROOT, &data)?)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

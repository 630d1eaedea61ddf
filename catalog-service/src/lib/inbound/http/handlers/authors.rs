use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthorData;
use crate::catalog::errors::CatalogError;
use crate::catalog::models::AuthorName;
use crate::catalog::models::NewAuthor;
use crate::inbound::http::negotiation::Negotiated;
use crate::inbound::http::negotiation::ResponseFormat;
use crate::inbound::http::router::AppState;

pub const AUTHORS_ROOT: &str = "authors";

pub async fn list_authors(
    State(state): State<AppState>,
    format: ResponseFormat,
) -> Result<Negotiated, ApiError> {
    let authors = state.catalog_service.list_authors().await?;
    let data: Vec<AuthorData> = authors.iter().map(AuthorData::from).collect();

    Ok(Negotiated::collection(format, AUTHORS_ROOT, &data)?)
}

pub async fn create_author(
    State(state): State<AppState>,
    body: Result<Json<CreateAuthorRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthorCreatedData>, ApiError> {
    let Json(body) = body?;

    state
        .catalog_service
        .add_author(body.try_into_new_author()?)
        .await
        .map_err(ApiError::from)
        .map(|author_id| {
            ApiSuccess::new(
                StatusCode::CREATED,
                AuthorCreatedData {
                    message: "Author added".to_string(),
                    author_id: author_id.0,
                },
            )
        })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAuthorRequest {
    first_name: Option<String>,
    last_name: Option<String>,
}

impl CreateAuthorRequest {
    fn try_into_new_author(self) -> Result<NewAuthor, CatalogError> {
        Ok(NewAuthor {
            first_name: AuthorName::new(self.first_name.unwrap_or_default())?,
            last_name: AuthorName::new(self.last_name.unwrap_or_default())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCreatedData {
    pub message: String,
    pub author_id: i64,
}

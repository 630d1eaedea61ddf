use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::extract::FromRef;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use axum_extra::extract::cookie::Key;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authors::create_author;
use super::handlers::authors::list_authors;
use super::handlers::books::create_book;
use super::handlers::books::delete_book;
use super::handlers::books::get_book;
use super::handlers::books::list_books;
use super::handlers::books::update_book;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::search::search_books;
use super::middleware::authenticate as auth_middleware;
use crate::account::ports::AccountServicePort;
use crate::catalog::ports::CatalogServicePort;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServicePort>,
    pub catalog_service: Arc<dyn CatalogServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub cookie_key: Key,
    pub secure_cookie: bool,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub secure_cookie: bool,
}

pub fn create_router(
    account_service: Arc<dyn AccountServicePort>,
    catalog_service: Arc<dyn CatalogServicePort>,
    authenticator: Arc<Authenticator>,
    session: SessionSettings,
) -> Router {
    let state = AppState {
        account_service,
        catalog_service,
        authenticator,
        cookie_key: session.key,
        secure_cookie: session.secure_cookie,
    };

    let public_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let protected_routes = Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/search", get(search_books))
        .route("/authors", get(list_authors).post(create_author))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers stay out of the span: they carry bearer tokens and session cookies.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

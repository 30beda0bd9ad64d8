//! API handlers and router for Libris REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::ErrorResponse, AppState};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(middleware::from_fn(attach_error_path))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Error bodies are rendered without the request path; fill it in here.
async fn attach_error_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorResponse>() {
        Some(body) => (response.status(), Json(body.with_path(path))).into_response(),
        None => response,
    }
}

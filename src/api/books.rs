//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookRequest, BookResponse, BookSearchQuery},
    AppState,
};

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<BookResponse>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.books.list_all().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input (field -> message map)"),
        (status = 409, description = "ISBN already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<BookRequest>, AppError>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let created = state.services.books.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid input (field -> message map)"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<BookRequest>, AppError>,
) -> AppResult<Json<BookResponse>> {
    let updated = state.services.books.update(id, request).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search books by title (or author)
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookSearchQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookResponse>)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<BookSearchQuery>, AppError>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.books.search(&query).await?;
    Ok(Json(books))
}

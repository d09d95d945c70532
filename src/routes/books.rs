use crate::app::AppState;
use crate::error::ApiError;
use crate::models::books::{Book, BookCreate, BookUpdate};
use crate::models::responses::MessageResponse;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<BookCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let Json(book) = payload?;
    info!("Creating book with ISBN {}", book.isbn);
    let created = state.store.create_book(&book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_books(
    params: Result<Query<ListParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let Query(params) = params?;
    if params.skip < 0 {
        return Err(ApiError::Unprocessable("skip must be >= 0".to_string()));
    }
    if !(1..=1000).contains(&params.limit) {
        return Err(ApiError::Unprocessable(
            "limit must be between 1 and 1000".to_string(),
        ));
    }

    Ok(Json(state.store.list_books(params.skip, params.limit).await?))
}

pub async fn get_book(
    book_id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Book>, ApiError> {
    let Path(book_id) = book_id?;
    state
        .store
        .get_book(book_id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::book_not_found)
}

pub async fn books_by_author(
    Path(author): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.store.books_by_author(&author).await?))
}

pub async fn book_by_isbn(
    Path(isbn): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Book>, ApiError> {
    state
        .store
        .book_by_isbn(&isbn)
        .await?
        .map(Json)
        .ok_or_else(ApiError::book_not_found)
}

pub async fn update_book(
    book_id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<BookUpdate>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Path(book_id) = book_id?;
    let Json(update) = payload?;
    info!("Updating book {}", book_id);
    state
        .store
        .update_book(book_id, &update)
        .await?
        .map(Json)
        .ok_or_else(ApiError::book_not_found)
}

pub async fn delete_book(
    book_id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(book_id) = book_id?;
    if !state.store.delete_book(book_id).await? {
        return Err(ApiError::book_not_found());
    }

    info!("Deleted book {}", book_id);
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

pub async fn search_books(
    Path(query): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.store.search_books(&query).await?))
}

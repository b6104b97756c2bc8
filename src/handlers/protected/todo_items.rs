use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::Pagination;
use crate::types::{PagedResults, TodoItemInput, TodoItemOutput};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

fn item_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::bad_request(format!("Invalid todo item id: {}", e.body_text())))
}

fn json_body(body: Result<Json<TodoItemInput>, JsonRejection>) -> Result<TodoItemInput, ApiError> {
    body.map(|Json(input)| input)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// GET /todoitems?page=&pageSize= - the caller's items, one page at a time
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<PagedResults<TodoItemOutput>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let pagination = Pagination::from_query(query.page, query.page_size, state.default_page_size)
        .map_err(|errors| {
            ApiError::validation_error(
                "One or more validation errors occurred.",
                Some(errors.into_inner()),
            )
        })?;

    let page = state.todos.list(&user.username, pagination).await?;
    Ok(ApiResponse::success(page))
}

/// GET /todoitems/:id
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<TodoItemOutput> {
    let id = item_id(path)?;
    let item = state.todos.get(&user.username, id).await?;
    Ok(ApiResponse::success(item))
}

/// POST /todoitems - 201 with a Location header for the new item
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<TodoItemInput>, JsonRejection>,
) -> ApiResult<TodoItemOutput> {
    let input = json_body(body)?;
    let created = state.todos.create(&user.username, input).await?;
    Ok(ApiResponse::created(created.item, created.location))
}

/// PUT /todoitems/:id - only `isCompleted` is applied
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoItemInput>, JsonRejection>,
) -> ApiResult<()> {
    let id = item_id(path)?;
    let input = json_body(body)?;
    state.todos.update(&user.username, id, input).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /todoitems/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = item_id(path)?;
    state.todos.delete(&user.username, id).await?;
    Ok(ApiResponse::no_content())
}

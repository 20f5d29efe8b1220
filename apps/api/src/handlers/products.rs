use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use veta_core::{Product, ProductInput};

use super::ListParams;
use crate::error::ApiResult;
use crate::AppState;

/// Active products of active materials, or everything with `?all=true`.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Product>>> {
    let Query(params) = query?;
    Ok(Json(state.db.products().list(params.all).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(input) = payload?;
    let product = state.db.products().create(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.db.products().update(id, &input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.db.products().soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

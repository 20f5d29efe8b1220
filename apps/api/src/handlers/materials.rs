use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use veta_core::{Material, MaterialInput};

use super::ListParams;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Material>>> {
    let Query(params) = query?;
    Ok(Json(state.db.materials().list(params.all).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<MaterialInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Material>)> {
    let Json(input) = payload?;
    let material = state.db.materials().create(&input).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MaterialInput>, JsonRejection>,
) -> ApiResult<Json<Material>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.db.materials().update(id, &input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.db.materials().soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

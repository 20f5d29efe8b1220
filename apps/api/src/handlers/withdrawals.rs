//! Withdrawal ("salida") endpoints.
//!
//! Creation assigns the `TAG-NNNN` code in the same transaction as the
//! insert; `POST /exit/:id/code` re-runs the assignment for rows left
//! without one.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use serde::Serialize;
use veta_core::{WithdrawalDetail, WithdrawalInput};

use super::ListParams;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Today's withdrawals by default, every active one with `?all=true`.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<WithdrawalDetail>>> {
    let Query(params) = query?;
    let repo = state.db.withdrawals();
    let rows = if params.all {
        repo.list_active().await?
    } else {
        repo.list_day(Local::now().date_naive()).await?
    };
    Ok(Json(rows))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<WithdrawalDetail>> {
    let Path(id) = path?;
    state
        .db
        .withdrawals()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Withdrawal not found: {id}")))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<WithdrawalInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WithdrawalDetail>)> {
    let Json(input) = payload?;
    let withdrawal = state.db.withdrawals().create(&input).await?;
    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<WithdrawalInput>, JsonRejection>,
) -> ApiResult<Json<WithdrawalDetail>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.db.withdrawals().update(id, &input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.db.withdrawals().soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct AssignedCode {
    pub id: i64,
    pub code: String,
}

/// Assigns a fresh code to an active withdrawal.
pub async fn assign_code(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<AssignedCode>> {
    let Path(id) = path?;
    let repo = state.db.withdrawals();
    let withdrawal = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Withdrawal not found: {id}")))?;

    let code = repo.assign_code(id, withdrawal.material_id).await?;
    Ok(Json(AssignedCode { id, code }))
}

//! # Report Export
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  path params ──► ReportScope (400 on bad year-month / level)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportRepository::query ──► Report::new (404 when the window is empty)│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PdfRenderer::render (blocking pool) ──► application/pdf attachment    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Local;
use tracing::info;
use veta_core::{Report, ReportScope};
use veta_report::PDF_CONTENT_TYPE;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn daily(State(state): State<AppState>) -> ApiResult<Response> {
    export(state, ReportScope::daily(Local::now().date_naive())).await
}

pub async fn monthly(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(year_month) = path?;
    export(state, ReportScope::monthly(&year_month)?).await
}

pub async fn monthly_total(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(year_month) = path?;
    export(state, ReportScope::monthly_total(&year_month)?).await
}

pub async fn monthly_level(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Response> {
    let Path((year_month, level)) = path?;
    export(state, ReportScope::monthly_level(&year_month, &level)?).await
}

pub async fn monthly_level_total(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Response> {
    let Path((year_month, level)) = path?;
    export(state, ReportScope::monthly_level_total(&year_month, &level)?).await
}

async fn export(state: AppState, scope: ReportScope) -> ApiResult<Response> {
    let rows = state.db.reports().query(&scope).await?;
    let report = Report::new(scope.clone(), rows).ok_or_else(|| not_found(&scope))?;

    let file_name = report.file_name();
    let row_count = report.rows().len();
    let renderer = state.renderer.clone();
    let bytes = tokio::task::spawn_blocking(move || renderer.render(&report))
        .await
        .map_err(|e| ApiError::Internal(format!("render task failed: {e}")))??;

    info!(file = %file_name, rows = row_count, bytes = bytes.len(), "Report generated");

    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn not_found(scope: &ReportScope) -> ApiError {
    match scope {
        ReportScope::Daily { .. } => {
            ApiError::NotFound("No hay salidas registradas hoy".to_string())
        }
        _ => ApiError::NotFound(format!("No hay salidas registradas para {}", scope.label())),
    }
}

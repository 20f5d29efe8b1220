//! # veta-api: HTTP Surface for Veta
//!
//! Routes, shared state and error mapping. `main.rs` only loads config,
//! opens the database and serves [`router`].
//!
//! ## Routes (all under `/api`)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /health                                                         │
//! │  GET    /materials            POST /materials                           │
//! │  PUT    /materials/:id        DELETE /materials/:id                     │
//! │  GET    /products             POST /products                            │
//! │  PUT    /products/:id         DELETE /products/:id                      │
//! │  GET    /exit                 POST /exit                                │
//! │  GET    /exit/:id             PUT /exit/:id       DELETE /exit/:id      │
//! │  POST   /exit/:id/code                                                  │
//! │  GET    /reporte-dia                                                    │
//! │  GET    /reportes/mensual/:year_month[/:level]                          │
//! │  GET    /reportes/mensual-total/:year_month[/:level]                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use veta_db::Database;
use veta_report::PdfRenderer;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub renderer: Arc<PdfRenderer>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            db,
            renderer: Arc::new(PdfRenderer::default()),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    use handlers::{health, materials, products, reports, withdrawals};

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/materials", get(materials::list).post(materials::create))
        .route(
            "/materials/:id",
            put(materials::update).delete(materials::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            put(products::update).delete(products::delete),
        )
        .route("/exit", get(withdrawals::list).post(withdrawals::create))
        .route(
            "/exit/:id",
            get(withdrawals::get)
                .put(withdrawals::update)
                .delete(withdrawals::delete),
        )
        .route("/exit/:id/code", post(withdrawals::assign_code))
        .route("/reporte-dia", get(reports::daily))
        .route("/reportes/mensual/:year_month", get(reports::monthly))
        .route(
            "/reportes/mensual/:year_month/:level",
            get(reports::monthly_level),
        )
        .route(
            "/reportes/mensual-total/:year_month",
            get(reports::monthly_total),
        )
        .route(
            "/reportes/mensual-total/:year_month/:level",
            get(reports::monthly_level_total),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

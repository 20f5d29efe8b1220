//! HTTP handlers, one module per resource.

pub mod health;
pub mod materials;
pub mod products;
pub mod reports;
pub mod withdrawals;

use serde::Deserialize;

/// `?all=true` query flag shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub all: bool,
}

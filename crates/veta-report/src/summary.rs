//! # QR Summary
//!
//! Text embedded in the report's QR code: a header line followed by one line
//! per row, in print order.
//!
//! ## Capacity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reporte del 2024-02                                                    │
//! │  Código: COB-0001, Material: Cobre, ...                                 │
//! │  Código: COB-0002, Material: Cobre, ...                                 │
//! │  ...                          ◄── stops at a row boundary before the    │
//! │  … (+37 filas)                    byte budget, then counts what's left  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A version-40 symbol at error level L holds 2953 bytes; the budget stays
//! below that so the marker always fits.

use veta_core::Report;

/// Default byte budget of the QR payload.
pub const QR_MAX_BYTES: usize = 2800;

/// Bytes kept free for the truncation marker.
const MARKER_RESERVE: usize = 32;

/// Builds the QR payload of `report`, at most `max_bytes` long.
///
/// Whole rows are dropped from the end when the summary does not fit; the
/// last line then reads `… (+N filas)`.
pub fn qr_payload(report: &Report, max_bytes: usize) -> String {
    let full = report.summary();
    if full.len() <= max_bytes {
        return full;
    }

    let mut lines = full.lines();
    let mut payload = String::new();
    if let Some(header) = lines.next() {
        payload.push_str(header);
        payload.push('\n');
    }

    let rows: Vec<&str> = lines.collect();
    let budget = max_bytes.saturating_sub(MARKER_RESERVE);
    let mut kept = 0;
    for row in &rows {
        if payload.len() + row.len() + 1 > budget {
            break;
        }
        payload.push_str(row);
        payload.push('\n');
        kept += 1;
    }

    payload.push_str(&format!("… (+{} filas)", rows.len() - kept));
    payload
}

// =============================================================================
// Unit Tests
// =============================================================================

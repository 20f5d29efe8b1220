//! # QR Matrix
//!
//! Encodes text into a square grid of dark/light modules. The PDF renderer
//! paints each dark module as a filled square, so no raster image codec is
//! involved.

use qrcode::{Color as ModuleColor, EcLevel, QrCode};

use crate::error::{RenderError, RenderResult};

/// A square QR module grid, row-major, `true` = dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Encodes `text` at error-correction level L (largest capacity).
    pub fn encode(text: &str) -> RenderResult<Self> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L)
            .map_err(|e| RenderError::Qr(e.to_string()))?;

        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == ModuleColor::Dark)
            .collect();

        Ok(QrMatrix {
            width: code.width(),
            modules,
        })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (`x`, `y`) is dark. `y = 0` is the top row.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Dark modules as `(x, y)` pairs, top row first.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(i, _)| (i % width, i / width))
    }
}

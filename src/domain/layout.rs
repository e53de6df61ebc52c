//! Canvas geometry and per-row node placement.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Position;
use crate::domain::error::DomainError;

/// Fixed drawing extent the forest is laid out in.
///
/// Rows are stacked bottom-up: level 0 sits one margin above the bottom edge
/// and every level above it moves up by `level_height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Vertical distance between two levels
    pub level_height: f64,
    /// Preferred horizontal distance between neighbours in a row
    pub node_spacing: f64,
    /// Distance nodes keep from every canvas edge
    pub margin: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            level_height: 60.0,
            node_spacing: 80.0,
            margin: 40.0,
        }
    }
}

impl Canvas {
    pub fn validate(&self) -> Result<(), DomainError> {
        let all_finite = [
            self.width,
            self.height,
            self.level_height,
            self.node_spacing,
            self.margin,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(DomainError::InvalidCanvas("values must be finite".into()));
        }
        if self.margin < 0.0 {
            return Err(DomainError::InvalidCanvas("margin must not be negative".into()));
        }
        if self.width <= 2.0 * self.margin || self.height <= 2.0 * self.margin {
            return Err(DomainError::InvalidCanvas(format!(
                "{}x{} leaves no room inside margin {}",
                self.width, self.height, self.margin
            )));
        }
        if self.level_height <= 0.0 || self.node_spacing <= 0.0 {
            return Err(DomainError::InvalidCanvas(
                "level_height and node_spacing must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Position of the `index`-th node in a row of `row_len` nodes at `level`.
    ///
    /// The row is centred horizontally with even spacing. Spacing shrinks when
    /// the row would not fit between the side margins; the result is clamped
    /// to the margins in both directions.
    pub fn position(&self, level: usize, index: usize, row_len: usize) -> Position {
        let row_len = row_len.max(1);
        let gaps = (row_len - 1) as f64;

        let y = self.height - self.margin - level as f64 * self.level_height;

        let usable = self.width - 2.0 * self.margin;
        let spacing = if row_len > 1 {
            self.node_spacing.min(usable / gaps)
        } else {
            0.0
        };
        let x = self.width / 2.0 - spacing * gaps / 2.0 + index as f64 * spacing;

        Position::new(
            x.max(self.margin).min(self.width - self.margin),
            y.max(self.margin).min(self.height - self.margin),
        )
    }
}

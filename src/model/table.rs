//! Table grid types.

use crate::model::fill::{Fill, Outline};
use crate::model::shape::Transform;
use crate::model::text::TextBody;
use crate::units::Emu;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub width: Emu,
}

/// Per-cell border overrides. A `None` side draws nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellBorders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Outline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Outline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Outline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Outline>,
}

impl CellBorders {
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<TextBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<CellBorders>,
    /// Number of grid columns this cell spans (>= 1).
    pub grid_span: usize,
    /// Number of grid rows this cell spans (>= 1).
    pub row_span: usize,
    /// Continuation of a horizontal merge; not painted but consumes width.
    pub h_merge: bool,
    /// Continuation of a vertical merge; not painted but consumes height.
    pub v_merge: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub height: Emu,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableElement {
    pub transform: Transform,
    pub table: Table,
}

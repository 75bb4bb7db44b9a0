//! Sparse tables.
//!
//! Only populated cells are stored. `row_count`/`col_count` declare the dense
//! bounds; the dense grid is materialized on demand by [`Table::to_grid`].

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

/// A cell within a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub bbox: Option<BBox>,
}

/// A table extracted from a document page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Page number (0-indexed).
    pub page: usize,
    #[serde(default)]
    pub cells: Vec<TableCell>,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub col_count: usize,
    #[serde(default)]
    pub bbox: Option<BBox>,
}

impl Table {
    pub fn new(page: usize, row_count: usize, col_count: usize) -> Self {
        Self {
            page,
            cells: Vec::new(),
            row_count,
            col_count,
            bbox: None,
        }
    }

    /// Looks up the populated cell at (row, col). The last one wins on duplicates.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.cells
            .iter()
            .rev()
            .find(|cell| cell.row == row && cell.col == col)
    }

    /// Builds the dense `row_count x col_count` text grid.
    ///
    /// Missing cells become empty strings; cells outside the declared bounds
    /// are ignored.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let mut grid = vec![vec![String::new(); self.col_count]; self.row_count];
        for cell in &self.cells {
            if let Some(slot) = grid.get_mut(cell.row).and_then(|row| row.get_mut(cell.col)) {
                slot.clone_from(&cell.text);
            }
        }
        grid
    }
}

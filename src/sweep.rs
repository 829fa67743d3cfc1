//! Row sweep emitter
//!
//! Turns per-row boundary records into the sparse two-table output: a
//! left-to-right pass accumulates winding deltas and emits interior
//! [`Run`]s between boundary cells while the count is nonzero, and an
//! [`Edge`] (or a length-one run for saturated cells) per fractionally
//! covered cell. All emitted indices are 1-based.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coverage below this is dropped, above `1 - COVERAGE_TOL` the cell
/// counts as fully covered.
pub const COVERAGE_TOL: f32 = 1e-6;

/// Contiguous span of fully covered interior cells in one grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Run {
    /// 1-based grid row
    pub row: i32,
    /// 1-based first covered column
    pub col_start: i32,
    /// 1-based last covered column
    pub col_end: i32,
    /// 1-based id of the source polygon
    pub id: i32,
}

/// Single fractionally covered boundary cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    /// 1-based grid row
    pub row: i32,
    /// 1-based grid column
    pub col: i32,
    /// covered fraction of the cell, strictly inside (0, 1)
    pub weight: f32,
    /// 1-based id of the source polygon
    pub id: i32,
}

/// Sparse intersection database: interior runs plus boundary edges, and
/// the number of input geometries that were skipped as invalid.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseResult {
    pub runs: Vec<Run>,
    pub edges: Vec<Edge>,
    pub skipped: usize,
}

/// Everything accrued for one boundary cell of a sweep row: the full-grid
/// column (padding columns use -1 and ncols), the signed coverage sum of
/// all ring visits, and their winding deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundaryCellRecord {
    pub col: i64,
    pub coverage: f32,
    pub winding: i32,
}

impl BoundaryCellRecord {
    pub fn new(col: i64) -> Self {
        Self {
            col,
            coverage: 0.0,
            winding: 0,
        }
    }
}

/// Emit one row: sort records by column, merge duplicates, then walk left
/// to right tracking the winding count.
///
/// `prev_col` starts at -2, meaning no cell seen yet; -1 is a legal value
/// (the left padding column), which is what lets a polygon reaching past
/// the grid edge open its interior run at the first real column.
pub(crate) fn sweep_row(
    row_vec: &mut Vec<BoundaryCellRecord>,
    full_row: i32,
    id: i32,
    runs: &mut Vec<Run>,
    edges: &mut Vec<Edge>,
) {
    if row_vec.is_empty() {
        return;
    }
    row_vec.sort_unstable_by_key(|rec| rec.col);

    let mut merged: Vec<BoundaryCellRecord> = Vec::with_capacity(row_vec.len());
    for rec in row_vec.iter() {
        if let Some(last) = merged.last_mut() {
            if last.col == rec.col {
                last.coverage += rec.coverage;
                last.winding += rec.winding;
                continue;
            }
        }
        merged.push(*rec);
    }

    let mut winding = 0i32;
    let mut prev_col = -2i64;

    for mc in &merged {
        if winding != 0 && prev_col > -2 && mc.col > prev_col + 1 {
            runs.push(Run {
                row: full_row,
                col_start: (prev_col + 1) as i32 + 1,
                col_end: (mc.col - 1) as i32 + 1,
                id,
            });
        }

        let w = mc.coverage;
        if w > COVERAGE_TOL && w < 1.0 - COVERAGE_TOL {
            edges.push(Edge {
                row: full_row,
                col: mc.col as i32 + 1,
                weight: w,
                id,
            });
        } else if w >= 1.0 - COVERAGE_TOL {
            // saturated boundary cell, e.g. stacked up by several rings
            runs.push(Run {
                row: full_row,
                col_start: mc.col as i32 + 1,
                col_end: mc.col as i32 + 1,
                id,
            });
        }

        winding += mc.winding;
        prev_col = mc.col;
    }
}

//! Ring walker
//!
//! Traces a polygon ring cell by cell through the padded sub-grid,
//! recording one [`Traversal`] per cell visit, then folds the visited
//! cells into per-row boundary records: a signed coverage fraction for
//! real cells and winding deltas for real and padding cells alike.
//! Winding must be recorded even where coverage evaluates to zero (an
//! edge running exactly along a cell wall still crosses row mid-lines);
//! dropping such cells would let the emitter's running count drift.
use crate::{
    coverage::{analytical_covered_fraction, closed_ring_covered_fraction, left_hand_area},
    sweep::BoundaryCellRecord,
    BBox, Location, PaddedGrid, Point, Side,
};
use std::collections::BTreeMap;

/// One visit of a ring to a single cell: the ordered coordinates inside
/// the cell (entry, intermediates, exit) plus the sides the ring entered
/// and left through.
#[derive(Debug, Clone)]
pub struct Traversal {
    pub coords: Vec<Point>,
    pub entry: Side,
    pub exit: Side,
}

impl Traversal {
    fn new() -> Self {
        Self {
            coords: Vec::new(),
            entry: Side::None,
            exit: Side::None,
        }
    }

    /// Both an entry and an exit side are known.
    pub fn traversed(&self) -> bool {
        self.entry != Side::None && self.exit != Side::None
    }

    /// The coordinates form a closed ring that never left the cell.
    pub fn is_closed_ring(&self) -> bool {
        self.coords.len() >= 3 && self.coords[0] == self.coords[self.coords.len() - 1]
    }

    pub fn has_multiple_unique_coords(&self) -> bool {
        match self.coords.split_first() {
            Some((first, rest)) => rest.iter().any(|c| c != first),
            None => false,
        }
    }

    /// Valid traversals contribute to coverage: a proper pass through the
    /// cell, or a closed ring contained in it.
    fn is_valid(&self) -> bool {
        (self.traversed() && self.has_multiple_unique_coords())
            || (self.entry == Side::None && self.is_closed_ring())
    }
}

/// Everything accrued for one padded-grid cell during a ring walk.
#[derive(Debug, Clone)]
pub struct CellRecord {
    pub bbox: BBox,
    pub traversals: Vec<Traversal>,
}

/// Walk one ring through the padded sub-grid and merge its coverage and
/// winding contributions into `row_data`.
///
/// The ring is normalised to counter-clockwise order before walking, so
/// the covered region always lies to the left of the travel direction;
/// holes flip the sign of both contributions.
pub(crate) fn walk_ring(
    mut coords: Vec<Point>,
    is_ccw: bool,
    is_exterior: bool,
    grid: &PaddedGrid,
    row_data: &mut [Vec<BoundaryCellRecord>],
    sub_cols: usize,
    col_off: usize,
) {
    if coords.len() < 4 {
        return;
    }
    if !is_ccw {
        coords.reverse();
    }
    let coverage_factor: f32 = if is_exterior { 1.0 } else { -1.0 };
    let winding_factor: i32 = if is_exterior { 1 } else { -1 };

    let cells = trace(coords, grid);
    record_cells(
        &cells,
        coverage_factor,
        winding_factor,
        row_data,
        sub_cols,
        col_off,
    );
}

/// Trace the ring through padded-grid cells, one traversal per cell visit.
fn trace(mut coords: Vec<Point>, grid: &PaddedGrid) -> BTreeMap<(usize, usize), CellRecord> {
    let mut cells: BTreeMap<(usize, usize), CellRecord> = BTreeMap::new();

    let mut pos = 0;
    let mut row = grid.row_of(coords[0].y());
    let mut col = grid.col_of(coords[0].x());
    // interpolated exit point carried over as the next cell's entry
    let mut last_exit: Option<Point> = None;

    while pos < coords.len() {
        let bbox = grid.cell(row, col);
        let mut trav = Traversal::new();

        while pos < coords.len() {
            let next = match last_exit {
                Some(p) => p,
                None => coords[pos],
            };

            if trav.coords.is_empty() {
                // first coordinate of this visit enters the cell
                trav.entry = bbox.side(next);
                trav.coords.push(next);
                if last_exit.take().is_none() {
                    pos += 1;
                }
                continue;
            }

            if bbox.locate(next) != Location::Outside {
                trav.coords.push(next);
                if last_exit.take().is_none() {
                    pos += 1;
                }
            } else {
                // anchor the crossing at the previous original coordinate,
                // not the stored entry point, to avoid catastrophic
                // cancellation on tiny geometry
                let from = if pos > 0 {
                    coords[pos - 1]
                } else {
                    trav.coords[trav.coords.len() - 1]
                };
                let x = bbox.crossing(from, next);
                trav.coords.push(x.coord);
                trav.exit = x.side;
                if x.coord != next {
                    last_exit = Some(x.coord);
                }
                break;
            }
        }

        // ring ran out of coordinates on this cell's boundary: force the
        // exit through the side that contains the final point
        if trav.exit == Side::None {
            if let Some(&last) = trav.coords.last() {
                if bbox.locate(last) == Location::Boundary {
                    trav.exit = bbox.side(last);
                }
            }
        }

        let exited = trav.exit != Side::None;

        // the ring started strictly inside this cell and left before
        // closing: queue the coordinates seen so far at the tail of the
        // list, so the visit is replayed with a known entry side once the
        // ring walks back in
        if exited && trav.entry == Side::None {
            let replay = trav.coords.clone();
            coords.extend(replay);
        }

        let exit = trav.exit;
        cells
            .entry((row, col))
            .or_insert_with(|| CellRecord {
                bbox,
                traversals: Vec::new(),
            })
            .traversals
            .push(trav);

        if exited {
            match exit {
                Side::Top => row -= 1,
                Side::Bottom => row += 1,
                Side::Left => col -= 1,
                Side::Right => col += 1,
                Side::None => {}
            }
        }
    }

    cells
}

/// Fold walked cells into per-row boundary records.
///
/// Padding rows are dropped. Padding columns keep their winding deltas at
/// the virtual full-grid columns `col_off - 1` and `col_off + sub_cols`,
/// so a polygon reaching past the grid edge still starts each row's
/// winding count correctly; coverage is only stored for real cells.
fn record_cells(
    cells: &BTreeMap<(usize, usize), CellRecord>,
    coverage_factor: f32,
    winding_factor: i32,
    row_data: &mut [Vec<BoundaryCellRecord>],
    sub_cols: usize,
    col_off: usize,
) {
    let sub_rows = row_data.len();

    for (&(r, c), cr) in cells {
        if r < 1 {
            continue;
        }
        let sub_r = r - 1;
        if sub_r >= sub_rows {
            continue;
        }

        let (full_col, in_grid) = if c < 1 {
            (col_off as i64 - 1, false)
        } else if c - 1 >= sub_cols {
            ((col_off + sub_cols) as i64, false)
        } else {
            ((col_off + c - 1) as i64, true)
        };

        let valid: Vec<&Traversal> = cr.traversals.iter().filter(|t| t.is_valid()).collect();
        if valid.is_empty() {
            continue;
        }

        let mut frac = 0.0;
        if in_grid {
            frac = if valid.len() == 1 && valid[0].entry == Side::None && valid[0].is_closed_ring()
            {
                closed_ring_covered_fraction(&cr.bbox, &valid[0].coords)
            } else if valid.len() == 1 {
                analytical_covered_fraction(&cr.bbox, &valid[0].coords)
            } else {
                let chains: Vec<&[Point]> =
                    valid.iter().map(|t| t.coords.as_slice()).collect();
                let cell_area = cr.bbox.area();
                if cell_area > 0.0 {
                    left_hand_area(&cr.bbox, &chains) / cell_area
                } else {
                    0.0
                }
            };
        }

        let row_vec = &mut row_data[sub_r];

        if frac != 0.0 {
            let rec = find_or_create(row_vec, full_col);
            rec.coverage += coverage_factor * frac as f32;
        }

        for t in &valid {
            // closed rings never cross a cell wall
            if !t.traversed() || t.coords.len() < 2 {
                continue;
            }
            let entry_y = t.coords[0].y();
            let exit_y = t.coords[t.coords.len() - 1].y();
            let y_mid = (cr.bbox.ymin + cr.bbox.ymax) / 2.0;
            let crosses = (entry_y > y_mid && exit_y < y_mid) || (entry_y < y_mid && exit_y > y_mid);
            if !crosses {
                continue;
            }
            let delta = winding_factor * if entry_y > y_mid { -1 } else { 1 };
            find_or_create(row_vec, full_col).winding += delta;
        }
    }
}

fn find_or_create(row_vec: &mut Vec<BoundaryCellRecord>, col: i64) -> &mut BoundaryCellRecord {
    match row_vec.iter().position(|r| r.col == col) {
        Some(i) => &mut row_vec[i],
        None => {
            row_vec.push(BoundaryCellRecord::new(col));
            let i = row_vec.len() - 1;
            &mut row_vec[i]
        }
    }
}

//! Per-polygon driver and the `scan_burn` entry point
//!
//! Each polygon component gets its own clipped sub-grid, row buffer and
//! sweep; holes share the exterior's buffers. Components of a
//! multi-polygon are processed independently so that one component's
//! winding can never bleed into another's boundary cells where their
//! bounding boxes touch the same row.
use crate::{
    geom::{Geometry, Polygon, ToGeometry},
    sweep::{sweep_row, BoundaryCellRecord, Edge, Run, SparseResult},
    walk::walk_ring,
    BBox, Grid, PaddedGrid, Scalar,
};
use std::fmt;

/// Failure of a burn entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Grid extent is inverted or collapsed
    InvalidExtent {
        xmin: Scalar,
        ymin: Scalar,
        xmax: Scalar,
        ymax: Scalar,
    },
    /// Grid has zero rows or columns
    InvalidDimension { cols: usize, rows: usize },
    /// Grid indices do not fit the signed 32-bit output range
    NumericOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidExtent {
                xmin,
                ymin,
                xmax,
                ymax,
            } => write!(
                f,
                "invalid extent: ({}, {}, {}, {}), xmax must be > xmin and ymax > ymin",
                xmin, ymin, xmax, ymax
            ),
            Error::InvalidDimension { cols, rows } => {
                write!(f, "invalid dimension: {} x {} cells", cols, rows)
            }
            Error::NumericOverflow => {
                write!(f, "grid index exceeds the signed 32-bit range, reduce the grid size")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Burn a set of polygons onto a grid, producing the sparse intersection
/// database.
///
/// `grid_extent` is `(xmin, ymin, xmax, ymax)`, `grid_cells` is
/// `(ncols, nrows)`. Each input's 1-based position becomes its `id`.
/// Geometries that fail to convert are skipped with a warning and counted
/// in [`SparseResult::skipped`]; empty geometries are skipped silently.
///
/// Within one polygon, runs and edges come out in row-major order. Across
/// polygons the streams follow input order; consumers that need a global
/// order sort by `(id, row, col)`.
pub fn scan_burn<I>(
    polygons: I,
    grid_extent: (Scalar, Scalar, Scalar, Scalar),
    grid_cells: (usize, usize),
) -> Result<SparseResult, Error>
where
    I: IntoIterator,
    I::Item: ToGeometry,
{
    let grid = make_grid(grid_extent, grid_cells)?;
    let mut runs = Vec::new();
    let mut edges = Vec::new();
    let mut skipped = 0usize;

    crate::timeit("scan_burn", || {
        for (k, item) in polygons.into_iter().enumerate() {
            let geometry = match item.to_geometry() {
                Ok(geometry) => geometry,
                Err(err) => {
                    log::warn!("skipping geometry {}: {}", k + 1, err);
                    skipped += 1;
                    continue;
                }
            };
            if geometry.is_empty() {
                continue;
            }
            burn_geometry(&geometry, &grid, (k + 1) as i32, &mut runs, &mut edges);
        }
    });

    Ok(SparseResult {
        runs,
        edges,
        skipped,
    })
}

/// Burn one geometry onto the grid, appending to the shared output.
///
/// This is the per-polygon unit of work: callers may fan out disjoint
/// polygons across threads, each with its own run/edge buffers, and
/// concatenate afterwards.
pub fn burn_geometry(
    geometry: &Geometry,
    grid: &Grid,
    id: i32,
    runs: &mut Vec<Run>,
    edges: &mut Vec<Edge>,
) {
    for polygon in geometry.polygons() {
        burn_polygon(polygon, grid, id, runs, edges);
    }
}

pub(crate) fn make_grid(
    extent: (Scalar, Scalar, Scalar, Scalar),
    cells: (usize, usize),
) -> Result<Grid, Error> {
    let (xmin, ymin, xmax, ymax) = extent;
    let (cols, rows) = cells;
    if !(xmax > xmin) || !(ymax > ymin) {
        return Err(Error::InvalidExtent {
            xmin,
            ymin,
            xmax,
            ymax,
        });
    }
    if cols == 0 || rows == 0 {
        return Err(Error::InvalidDimension { cols, rows });
    }
    if cols >= i32::MAX as usize || rows >= i32::MAX as usize {
        return Err(Error::NumericOverflow);
    }
    Ok(Grid::new(BBox::new(xmin, ymin, xmax, ymax), cols, rows))
}

/// Clipped sub-extent of a polygon: the union of its ring bounding boxes
/// intersected with the grid, snapped outward to cell boundaries. `None`
/// when the polygon misses the grid entirely.
pub(crate) fn clipped_subgrid(polygon: &Polygon, grid: &Grid) -> Option<Grid> {
    let mut region: Option<BBox> = None;
    for ring_box in polygon.ring_boxes() {
        if let Some(isect) = ring_box.intersect(grid.extent()) {
            region = Some(match region {
                Some(r) => r.union(isect),
                None => isect,
            });
        }
    }
    region.map(|r| grid.shrink_to_fit(r))
}

fn burn_polygon(polygon: &Polygon, grid: &Grid, id: i32, runs: &mut Vec<Run>, edges: &mut Vec<Edge>) {
    let sub = match clipped_subgrid(polygon, grid) {
        Some(sub) => sub,
        None => return,
    };
    let padded = PaddedGrid::new(sub);
    let row_off = grid.row_offset(&sub);
    let col_off = grid.col_offset(&sub);
    let sub_cols = sub.cols();

    let mut row_data: Vec<Vec<BoundaryCellRecord>> = vec![Vec::new(); sub.rows()];

    let exterior = polygon.exterior();
    walk_ring(
        exterior.coords().to_vec(),
        exterior.is_ccw(),
        true,
        &padded,
        &mut row_data,
        sub_cols,
        col_off,
    );
    for hole in polygon.holes() {
        walk_ring(
            hole.coords().to_vec(),
            hole.is_ccw(),
            false,
            &padded,
            &mut row_data,
            sub_cols,
            col_off,
        );
    }

    for (sr, row_vec) in row_data.iter_mut().enumerate() {
        let full_row = (row_off + sr) as i32 + 1;
        sweep_row(row_vec, full_row, id, runs, edges);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::tests::accumulate;
    use crate::sweep::COVERAGE_TOL;
    use crate::{assert_approx_eq, signed_area, Ring};

    fn poly(xy: &[(Scalar, Scalar)]) -> Geometry {
        Geometry::Polygon(Polygon::new(Ring::from_xy(xy).unwrap(), Vec::new()))
    }

    fn poly_with_hole(exterior: &[(Scalar, Scalar)], hole: &[(Scalar, Scalar)]) -> Geometry {
        Geometry::Polygon(Polygon::new(
            Ring::from_xy(exterior).unwrap(),
            vec![Ring::from_xy(hole).unwrap()],
        ))
    }

    fn total_coverage(result: &SparseResult) -> f64 {
        let runs: f64 = result
            .runs
            .iter()
            .map(|r| (r.col_end - r.col_start + 1) as f64)
            .sum();
        let edges: f64 = result.edges.iter().map(|e| e.weight as f64).sum();
        runs + edges
    }

    fn check_invariants(result: &SparseResult, cols: i32, rows: i32) {
        for edge in &result.edges {
            assert!(
                edge.weight > COVERAGE_TOL && edge.weight < 1.0 - COVERAGE_TOL,
                "edge weight {} out of (tol, 1 - tol)",
                edge.weight
            );
            assert!(edge.row >= 1 && edge.row <= rows);
            assert!(edge.col >= 1 && edge.col <= cols);
        }
        for run in &result.runs {
            assert!(run.col_start <= run.col_end);
            assert!(run.col_start >= 1 && run.col_end <= cols);
            assert!(run.row >= 1 && run.row <= rows);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let none: Vec<Geometry> = Vec::new();
        assert!(matches!(
            scan_burn(none.clone(), (10.0, 0.0, 0.0, 10.0), (10, 10)),
            Err(Error::InvalidExtent { .. })
        ));
        assert!(matches!(
            scan_burn(none.clone(), (0.0, 0.0, 10.0, 10.0), (0, 10)),
            Err(Error::InvalidDimension { .. })
        ));
        assert!(matches!(
            scan_burn(none, (0.0, 0.0, 10.0, 10.0), (usize::MAX / 2, 10)),
            Err(Error::NumericOverflow)
        ));
    }

    #[test]
    fn test_unit_square_on_aligned_grid() {
        // square walls lie exactly on cell boundaries: pure interior runs
        let square = poly(&[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)]);
        let result = scan_burn([square], (0.0, 0.0, 10.0, 10.0), (20, 20)).unwrap();
        assert!(result.edges.is_empty());
        check_invariants(&result, 20, 20);

        let map = accumulate(&result);
        assert_eq!(map.len(), 16 * 16);
        for row in 3..=18 {
            for col in 3..=18 {
                let w = map.get(&(row, col)).copied().unwrap_or(0.0);
                assert_approx_eq!(w, 1.0, 1e-6);
            }
        }
    }

    #[test]
    fn test_diagonal_triangles_are_complementary() {
        let lower = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let upper = poly(&[(0.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let result = scan_burn([lower, upper], (0.0, 0.0, 10.0, 10.0), (20, 20)).unwrap();
        check_invariants(&result, 20, 20);

        let map = accumulate(&result);
        assert_eq!(map.len(), 20 * 20);
        for row in 1..=20 {
            for col in 1..=20 {
                let w = map.get(&(row, col)).copied().unwrap_or(0.0);
                assert_approx_eq!(w, 1.0, 1e-5);
            }
        }
    }

    #[test]
    fn test_donut_filled_by_plug() {
        let donut = poly_with_hole(
            &[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)],
            &[(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)],
        );
        let plug = poly(&[(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)]);
        let result = scan_burn([donut, plug], (0.0, 0.0, 10.0, 10.0), (20, 20)).unwrap();
        check_invariants(&result, 20, 20);

        let map = accumulate(&result);
        assert_eq!(map.len(), 16 * 16);
        for (_, w) in map {
            assert_approx_eq!(w, 1.0, 1e-5);
        }
    }

    #[test]
    fn test_polygon_beyond_grid() {
        let big = poly(&[(-1.0, -1.0), (11.0, -1.0), (11.0, 11.0), (-1.0, 11.0)]);
        let result = scan_burn([big], (0.0, 0.0, 10.0, 10.0), (10, 10)).unwrap();
        assert!(result.edges.is_empty());
        assert_eq!(result.runs.len(), 10);
        for (i, run) in result.runs.iter().enumerate() {
            assert_eq!(run.row, i as i32 + 1);
            assert_eq!(run.col_start, 1);
            assert_eq!(run.col_end, 10);
        }
    }

    #[test]
    fn test_sub_cell_sliver() {
        let sliver = poly(&[(2.0, 4.95), (8.0, 4.95), (8.0, 5.05), (2.0, 5.05)]);
        let result = scan_burn([sliver], (0.0, 0.0, 10.0, 10.0), (10, 10)).unwrap();
        assert!(result.runs.is_empty());
        check_invariants(&result, 10, 10);
        // the sliver straddles the row boundary at y = 5: a band of edges
        // in the two middle rows
        for edge in &result.edges {
            assert!(edge.row == 5 || edge.row == 6, "row {}", edge.row);
            assert!(edge.weight < 0.1);
        }
        assert_approx_eq!(total_coverage(&result), 0.6, 1e-5);
    }

    #[test]
    fn test_adjacent_rectangles_share_weight() {
        let left = poly(&[(0.0, 0.0), (5.0, 0.0), (5.0, 10.0), (0.0, 10.0)]);
        let right = poly(&[(5.0, 0.0), (10.0, 0.0), (10.0, 10.0), (5.0, 10.0)]);
        // 13 columns put the shared wall x = 5 in the middle of a cell
        for cells in [(12usize, 12usize), (13, 13)] {
            let result = scan_burn(
                [left.clone(), right.clone()],
                (0.0, 0.0, 10.0, 10.0),
                cells,
            )
            .unwrap();
            check_invariants(&result, cells.0 as i32, cells.1 as i32);
            let map = accumulate(&result);
            assert_eq!(map.len(), cells.0 * cells.1);
            for (_, w) in map {
                assert_approx_eq!(w, 1.0, 1e-5);
            }
        }
    }

    #[test]
    fn test_ring_rotation_invariance() {
        let coords = [
            (1.2, 1.1),
            (8.7, 2.3),
            (7.4, 8.9),
            (3.1, 7.6),
        ];
        let reference = scan_burn(
            [poly(&coords)],
            (0.0, 0.0, 10.0, 10.0),
            (16, 16),
        )
        .unwrap();
        let mut sorted_ref = reference.clone();
        sorted_ref.runs.sort_by_key(|r| (r.row, r.col_start));
        sorted_ref.edges.sort_by_key(|e| (e.row, e.col));

        for shift in 1..coords.len() {
            let mut rotated = coords.to_vec();
            rotated.rotate_left(shift);
            let mut result = scan_burn(
                [poly(&rotated)],
                (0.0, 0.0, 10.0, 10.0),
                (16, 16),
            )
            .unwrap();
            result.runs.sort_by_key(|r| (r.row, r.col_start));
            result.edges.sort_by_key(|e| (e.row, e.col));

            assert_eq!(result.runs, sorted_ref.runs);
            assert_eq!(result.edges.len(), sorted_ref.edges.len());
            for (a, b) in result.edges.iter().zip(sorted_ref.edges.iter()) {
                assert_eq!((a.row, a.col), (b.row, b.col));
                assert_approx_eq!(a.weight as f64, b.weight as f64, 1e-6);
            }
        }
    }

    #[test]
    fn test_ring_reversal_invariance() {
        let coords = [(1.2, 1.1), (8.7, 2.3), (7.4, 8.9), (3.1, 7.6)];
        let mut reversed = coords.to_vec();
        reversed.reverse();

        let a = scan_burn([poly(&coords)], (0.0, 0.0, 10.0, 10.0), (16, 16)).unwrap();
        let b = scan_burn([poly(&reversed)], (0.0, 0.0, 10.0, 10.0), (16, 16)).unwrap();
        assert_eq!(a.runs, b.runs);
        assert_eq!(a.edges.len(), b.edges.len());
        for (ea, eb) in a.edges.iter().zip(b.edges.iter()) {
            assert_eq!((ea.row, ea.col), (eb.row, eb.col));
            assert_approx_eq!(ea.weight as f64, eb.weight as f64, 1e-6);
        }
    }

    #[test]
    fn test_total_area_matches_shoelace() {
        let coords = [(1.2, 1.1), (8.7, 2.3), (7.4, 8.9), (3.1, 7.6)];
        let ring = Ring::from_xy(&coords).unwrap();
        let expected = signed_area(ring.coords()).abs();

        let result = scan_burn([poly(&coords)], (0.0, 0.0, 10.0, 10.0), (20, 20)).unwrap();
        let cell_area = 0.5 * 0.5;
        assert_approx_eq!(total_coverage(&result) * cell_area, expected, 1e-4);
    }

    #[test]
    fn test_hole_subtraction() {
        // aligned hole: covered area is exterior minus hole
        let donut = poly_with_hole(
            &[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)],
            &[(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)],
        );
        let result = scan_burn([donut], (0.0, 0.0, 10.0, 10.0), (20, 20)).unwrap();
        let cell_area = 0.5 * 0.5;
        assert_approx_eq!(total_coverage(&result) * cell_area, 64.0 - 16.0, 1e-4);
        // no coverage inside the hole
        let map = accumulate(&result);
        for row in 8..=13 {
            for col in 8..=13 {
                assert!(!map.contains_key(&(row, col)), "hole cell ({}, {})", row, col);
            }
        }
    }

    #[test]
    fn test_disjoint_components_stay_independent() {
        // two squares sharing rows: winding of one component must not
        // promote the gap between them to interior
        let two = Geometry::MultiPolygon(vec![
            Polygon::new(
                Ring::from_xy(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]).unwrap(),
                Vec::new(),
            ),
            Polygon::new(
                Ring::from_xy(&[(6.0, 1.0), (8.0, 1.0), (8.0, 3.0), (6.0, 3.0)]).unwrap(),
                Vec::new(),
            ),
        ]);
        let result = scan_burn([two], (0.0, 0.0, 10.0, 10.0), (10, 10)).unwrap();
        for run in &result.runs {
            let in_left = run.col_start >= 2 && run.col_end <= 3;
            let in_right = run.col_start >= 7 && run.col_end <= 8;
            assert!(in_left || in_right, "bridging run {:?}", run);
        }
        let map = accumulate(&result);
        assert_eq!(map.len(), 2 * 4);
    }

    #[test]
    fn test_invalid_geometry_skipped() {
        let line = geo_types::Geometry::LineString(geo_types::LineString::from(vec![
            (0.0, 0.0),
            (5.0, 5.0),
        ]));
        let square = geo_types::Geometry::Polygon(geo_types::Polygon::new(
            geo_types::LineString::from(vec![(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)]),
            Vec::new(),
        ));
        let result = scan_burn([line, square], (0.0, 0.0, 10.0, 10.0), (10, 10)).unwrap();
        assert_eq!(result.skipped, 1);
        assert!(!result.runs.is_empty());
        // the surviving polygon keeps its original 1-based id
        assert!(result.runs.iter().all(|r| r.id == 2));
    }

    #[test]
    fn test_empty_and_degenerate_inputs() {
        let empty = geo_types::Polygon::new(geo_types::LineString::new(Vec::new()), Vec::new());
        let result = scan_burn([empty], (0.0, 0.0, 10.0, 10.0), (10, 10)).unwrap();
        assert_eq!(result.skipped, 0);
        assert!(result.runs.is_empty() && result.edges.is_empty());

        // zero-area ring produces no records
        let flat = poly(&[(2.0, 2.0), (8.0, 2.0), (5.0, 2.0)]);
        let result = scan_burn([flat], (0.0, 0.0, 10.0, 10.0), (10, 10)).unwrap();
        assert!(result.runs.is_empty() && result.edges.is_empty());
    }

    #[test]
    fn test_refinement_keeps_total_area() {
        let coords = [(1.2, 1.1), (8.7, 2.3), (7.4, 8.9), (3.1, 7.6)];
        let mut totals = Vec::new();
        let mut edge_counts = Vec::new();
        for n in [10usize, 20, 40] {
            let result = scan_burn([poly(&coords)], (0.0, 0.0, 10.0, 10.0), (n, n)).unwrap();
            let cell_area = (10.0 / n as f64) * (10.0 / n as f64);
            totals.push(total_coverage(&result) * cell_area);
            edge_counts.push(result.edges.len());
        }
        assert_approx_eq!(totals[0], totals[1], 1e-3);
        assert_approx_eq!(totals[1], totals[2], 1e-3);
        // boundary cell count grows roughly linearly with resolution
        assert!(edge_counts[1] < edge_counts[0] * 4);
        assert!(edge_counts[2] < edge_counts[1] * 4);
    }
}

//! Dense reference backend
//!
//! Computes the same sparse runs/edges output as the scanline core, but
//! the slow, obvious way: a per-subgrid `f32` coverage matrix, every cell
//! filled with the exact clipped polygon area (axis-aligned
//! Sutherland-Hodgman clip, exterior minus holes), then run-length
//! encoded. Memory scales with the sub-grid area, so it only suits small
//! grids; its role is cross-validating the scanline sweep.
use crate::{
    burn::{clipped_subgrid, make_grid},
    geom::{Geometry, Polygon, ToGeometry},
    signed_area,
    sweep::{Edge, Run, SparseResult, COVERAGE_TOL},
    BBox, Grid, Point, Scalar,
};

/// Burn polygons through the dense reference path. Same contract as
/// [`scan_burn`](crate::scan_burn): identical grid parameters, identical
/// output tables, per-geometry skip semantics.
pub fn dense_burn<I>(
    polygons: I,
    grid_extent: (Scalar, Scalar, Scalar, Scalar),
    grid_cells: (usize, usize),
) -> Result<SparseResult, crate::Error>
where
    I: IntoIterator,
    I::Item: ToGeometry,
{
    let grid = make_grid(grid_extent, grid_cells)?;
    let mut runs = Vec::new();
    let mut edges = Vec::new();
    let mut skipped = 0usize;

    crate::timeit("dense_burn", || {
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
            dense_geometry(&geometry, &grid, (k + 1) as i32, &mut runs, &mut edges);
        }
    });

    Ok(SparseResult {
        runs,
        edges,
        skipped,
    })
}

fn dense_geometry(
    geometry: &Geometry,
    grid: &Grid,
    id: i32,
    runs: &mut Vec<Run>,
    edges: &mut Vec<Edge>,
) {
    for polygon in geometry.polygons() {
        dense_polygon(polygon, grid, id, runs, edges);
    }
}

fn dense_polygon(polygon: &Polygon, grid: &Grid, id: i32, runs: &mut Vec<Run>, edges: &mut Vec<Edge>) {
    let sub = match clipped_subgrid(polygon, grid) {
        Some(sub) => sub,
        None => return,
    };
    let (rows, cols) = (sub.rows(), sub.cols());

    let mut mat = vec![0f32; rows * cols];
    for row in 0..rows {
        for col in 0..cols {
            let cell = sub.cell(row, col);
            let cell_area = cell.area();
            if cell_area <= 0.0 {
                continue;
            }
            let mut covered = clipped_area(polygon.exterior().coords(), &cell);
            for hole in polygon.holes() {
                covered -= clipped_area(hole.coords(), &cell);
            }
            mat[row * cols + col] = (covered.max(0.0) / cell_area) as f32;
        }
    }

    dense_to_sparse(
        &mat,
        rows,
        cols,
        grid.row_offset(&sub),
        grid.col_offset(&sub),
        id,
        runs,
        edges,
    );
}

/// Absolute area of a ring clipped to a box.
fn clipped_area(ring: &[Point], bbox: &BBox) -> Scalar {
    let mut pts: Vec<Point> = ring.to_vec();
    if pts.len() > 1 && pts[0] == pts[pts.len() - 1] {
        pts.pop();
    }
    pts = clip_edge(&pts, |p| p.x() >= bbox.xmin, |a, b| at_x(a, b, bbox.xmin));
    pts = clip_edge(&pts, |p| p.x() <= bbox.xmax, |a, b| at_x(a, b, bbox.xmax));
    pts = clip_edge(&pts, |p| p.y() >= bbox.ymin, |a, b| at_y(a, b, bbox.ymin));
    pts = clip_edge(&pts, |p| p.y() <= bbox.ymax, |a, b| at_y(a, b, bbox.ymax));
    signed_area(&pts).abs()
}

/// One Sutherland-Hodgman half-plane pass.
fn clip_edge(
    pts: &[Point],
    inside: impl Fn(Point) -> bool,
    intersect: impl Fn(Point, Point) -> Point,
) -> Vec<Point> {
    let mut out = Vec::with_capacity(pts.len() + 4);
    for i in 0..pts.len() {
        let cur = pts[i];
        let prev = pts[(i + pts.len() - 1) % pts.len()];
        match (inside(prev), inside(cur)) {
            (true, true) => out.push(cur),
            (true, false) => out.push(intersect(prev, cur)),
            (false, true) => {
                out.push(intersect(prev, cur));
                out.push(cur);
            }
            (false, false) => {}
        }
    }
    out
}

fn at_x(a: Point, b: Point, x: Scalar) -> Point {
    let t = (x - a.x()) / (b.x() - a.x());
    Point::new(x, a.y() + t * (b.y() - a.y()))
}

fn at_y(a: Point, b: Point, y: Scalar) -> Point {
    let t = (y - a.y()) / (b.y() - a.y());
    Point::new(a.x() + t * (b.x() - a.x()), y)
}

/// Run-length encode a dense coverage matrix into the sparse two-table
/// format. `row_offset` / `col_offset` place the matrix in the full grid;
/// emitted indices are 1-based.
#[allow(clippy::too_many_arguments)]
pub(crate) fn dense_to_sparse(
    mat: &[f32],
    nrow: usize,
    ncol: usize,
    row_offset: usize,
    col_offset: usize,
    id: i32,
    runs: &mut Vec<Run>,
    edges: &mut Vec<Edge>,
) {
    for i in 0..nrow {
        let full_row = (row_offset + i) as i32 + 1;
        // -1 means no active run
        let mut run_start = -1i32;

        for j in 0..ncol {
            let w = mat[i * ncol + j];

            if w <= 0.0 {
                if run_start >= 0 {
                    let full_col_end = (col_offset + j - 1) as i32 + 1;
                    runs.push(Run {
                        row: full_row,
                        col_start: run_start,
                        col_end: full_col_end,
                        id,
                    });
                    run_start = -1;
                }
                continue;
            }

            let full_col = (col_offset + j) as i32 + 1;

            if w >= 1.0 - COVERAGE_TOL {
                if run_start < 0 {
                    run_start = full_col;
                }
            } else {
                if run_start >= 0 {
                    let full_col_end = (col_offset + j - 1) as i32 + 1;
                    runs.push(Run {
                        row: full_row,
                        col_start: run_start,
                        col_end: full_col_end,
                        id,
                    });
                    run_start = -1;
                }
                edges.push(Edge {
                    row: full_row,
                    col: full_col,
                    weight: w,
                    id,
                });
            }
        }

        if run_start >= 0 {
            let full_col_end = (col_offset + ncol - 1) as i32 + 1;
            runs.push(Run {
                row: full_row,
                col_start: run_start,
                col_end: full_col_end,
                id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::tests::accumulate;
    use crate::{assert_approx_eq, scan_burn, Ring};

    fn poly(xy: &[(Scalar, Scalar)]) -> Geometry {
        Geometry::Polygon(Polygon::new(Ring::from_xy(xy).unwrap(), Vec::new()))
    }

    fn assert_backends_agree(geometries: Vec<Geometry>, cells: (usize, usize)) {
        let extent = (0.0, 0.0, 10.0, 10.0);
        let scan = scan_burn(geometries.clone(), extent, cells).unwrap();
        let dense = dense_burn(geometries, extent, cells).unwrap();

        let scan_map = accumulate(&scan);
        let dense_map = accumulate(&dense);
        for (cell, w) in &dense_map {
            let s = scan_map.get(cell).copied().unwrap_or(0.0);
            assert_approx_eq!(*w, s, 1e-5);
        }
        for (cell, w) in &scan_map {
            assert!(
                dense_map.contains_key(cell),
                "scanline covered ({}, {}) = {} but dense did not",
                cell.0,
                cell.1,
                w
            );
        }
    }

    #[test]
    fn test_clipped_area() {
        let cell = BBox::new(2.0, 2.0, 3.0, 3.0);
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
        ];
        assert_approx_eq!(clipped_area(&square, &cell), 1.0, 1e-12);

        let corner = [
            Point::new(0.0, 0.0),
            Point::new(2.5, 0.0),
            Point::new(2.5, 2.5),
            Point::new(0.0, 2.5),
            Point::new(0.0, 0.0),
        ];
        assert_approx_eq!(clipped_area(&corner, &cell), 0.25, 1e-12);

        let miss = [
            Point::new(5.0, 5.0),
            Point::new(6.0, 5.0),
            Point::new(6.0, 6.0),
            Point::new(5.0, 6.0),
            Point::new(5.0, 5.0),
        ];
        assert_approx_eq!(clipped_area(&miss, &cell), 0.0, 1e-12);
    }

    #[test]
    fn test_dense_to_sparse_rle() {
        // one row: edge, run of three, gap, saturated single
        let mat = [0.25f32, 1.0, 1.0, 1.0, 0.0, 1.0];
        let (mut runs, mut edges) = (Vec::new(), Vec::new());
        dense_to_sparse(&mat, 1, 6, 2, 4, 7, &mut runs, &mut edges);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].row, runs[0].col_start, runs[0].col_end), (3, 6, 8));
        assert_eq!((runs[1].row, runs[1].col_start, runs[1].col_end), (3, 10, 10));
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].row, edges[0].col), (3, 5));
        assert_approx_eq!(edges[0].weight as f64, 0.25, 1e-7);
        assert!(runs.iter().all(|r| r.id == 7) && edges[0].id == 7);
    }

    #[test]
    fn test_backends_agree_on_quad() {
        let quad = poly(&[(1.2, 1.1), (8.7, 2.3), (7.4, 8.9), (3.1, 7.6)]);
        assert_backends_agree(vec![quad], (16, 16));
    }

    #[test]
    fn test_backends_agree_on_triangles() {
        let lower = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let upper = poly(&[(0.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert_backends_agree(vec![lower, upper], (20, 20));
    }

    #[test]
    fn test_backends_agree_on_aligned_hole() {
        let donut = Geometry::Polygon(Polygon::new(
            Ring::from_xy(&[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)]).unwrap(),
            vec![Ring::from_xy(&[(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)]).unwrap()],
        ));
        assert_backends_agree(vec![donut], (20, 20));
    }

    #[test]
    fn test_backends_agree_beyond_grid() {
        let big = poly(&[(-3.0, -3.0), (13.0, -2.0), (12.0, 12.0), (-2.0, 13.0)]);
        assert_backends_agree(vec![big], (10, 10));
    }

    #[test]
    fn test_backends_agree_on_star() {
        // concave star: multiple traversals of single cells, re-entrant rows
        let mut coords = Vec::new();
        let n = 7usize;
        for i in 0..2 * n {
            let angle = std::f64::consts::PI * i as f64 / n as f64;
            let radius = if i % 2 == 0 { 4.5 } else { 1.8 };
            coords.push((5.0 + radius * angle.cos(), 5.0 + radius * angle.sin()));
        }
        assert_backends_agree(vec![poly(&coords)], (24, 24));
    }
}

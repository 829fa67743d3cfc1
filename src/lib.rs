#![deny(warnings)]
//! Sparse exact polygon-grid intersection.
//!
//! [`scan_burn`] intersects planar polygons with a regular rectangular
//! grid and returns, for every grid cell a polygon touches, the exact
//! fraction of the cell it covers - compressed as interior [`Run`]s
//! (coverage exactly 1, run-length encoded per row) plus boundary
//! [`Edge`]s (fractional weights). No dense raster is ever materialised:
//! per-polygon memory scales with the polygon's perimeter in cells, which
//! keeps tile sizes like 160000 x 80000 cells workable.
//!
//! The core is a scanline sweep: a ring walker traces each ring cell by
//! cell, analytical kernels turn the recorded traversals into covered
//! fractions, and a per-row emitter classifies interior cells by winding
//! number. Two companion backends exist for callers and tests:
//! [`dense_burn`], a per-subgrid matrix reference, and [`center_burn`],
//! a cell-centre-rule rasterizer without fractional weights.
//!
//! ```
//! use gridburn::scan_burn;
//!
//! let square = geo_types::Polygon::new(
//!     geo_types::LineString::from(vec![(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)]),
//!     vec![],
//! );
//! let result = scan_burn([square], (0.0, 0.0, 10.0, 10.0), (20, 20)).unwrap();
//! assert!(result.edges.is_empty()); // walls lie on cell boundaries
//! assert_eq!(result.runs[0].id, 1);
//! ```

pub mod burn;
pub mod coverage;
pub mod dense;
pub mod edgefill;
pub mod geom;
pub mod geometry;
pub mod grid;
pub mod sweep;
pub mod walk;

pub use burn::{burn_geometry, scan_burn, Error};
pub use dense::dense_burn;
pub use edgefill::center_burn;
pub use geom::{Geometry, GeometryError, GeometryKind, Polygon, Ring, ToGeometry};
pub use geometry::{
    perimeter_distance, signed_area, BBox, Crossing, Location, Point, Scalar, Side, EPSILON,
};
pub use grid::{Grid, PaddedGrid};
pub use sweep::{Edge, Run, SparseResult, COVERAGE_TOL};

/// Add debug log message with time taken to execute provided function
pub fn timeit<F: FnOnce() -> R, R>(msg: &str, f: F) -> R {
    let start = std::time::Instant::now();
    let result = f();
    log::debug!("{} {:?}", msg, start.elapsed());
    result
}

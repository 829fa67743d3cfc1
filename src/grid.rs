//! Cell layout over a rectangular extent
//!
//! Two variants: the bounded [`Grid`] indexes `[0, rows) x [0, cols)` with
//! row 0 at the top; the infinite-extent [`PaddedGrid`] shifts both indices
//! by one and surrounds the grid with virtual padding rows/columns whose
//! boxes are unbounded on the outward side, so ring segments arbitrarily
//! far outside the real grid still land in an addressable cell.
use crate::{BBox, Scalar};

/// Rectangular grid over an extent, row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    extent: BBox,
    dx: Scalar,
    dy: Scalar,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Grid covering `extent` with `cols x rows` cells.
    pub fn new(extent: BBox, cols: usize, rows: usize) -> Self {
        let dx = extent.width() / cols as Scalar;
        let dy = extent.height() / rows as Scalar;
        Self {
            extent,
            dx,
            dy,
            rows,
            cols,
        }
    }

    #[inline]
    pub fn extent(&self) -> BBox {
        self.extent
    }

    #[inline]
    pub fn dx(&self) -> Scalar {
        self.dx
    }

    #[inline]
    pub fn dy(&self) -> Scalar {
        self.dy
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row containing `y`, clamped into `[0, rows)`.
    pub fn row_of(&self, y: Scalar) -> usize {
        let r = ((self.extent.ymax - y) / self.dy).floor();
        if r < 0.0 {
            0
        } else {
            (r as usize).min(self.rows - 1)
        }
    }

    /// Column containing `x`, clamped into `[0, cols)`.
    pub fn col_of(&self, x: Scalar) -> usize {
        let c = ((x - self.extent.xmin) / self.dx).floor();
        if c < 0.0 {
            0
        } else {
            (c as usize).min(self.cols - 1)
        }
    }

    /// Axis-aligned box of the cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> BBox {
        BBox::new(
            self.extent.xmin + col as Scalar * self.dx,
            self.extent.ymax - (row + 1) as Scalar * self.dy,
            self.extent.xmin + (col + 1) as Scalar * self.dx,
            self.extent.ymax - row as Scalar * self.dy,
        )
    }

    /// The sub-grid covering `region`, snapped outward to cell boundaries.
    /// Never crosses this grid: the region is expected to lie within the
    /// extent (callers intersect with it first); coordinates on or past an
    /// edge snap to the outermost cell.
    pub fn shrink_to_fit(&self, region: BBox) -> Grid {
        let col0 = self.col_of(region.xmin);
        let col1 = self.col_of(region.xmax);
        let row0 = self.row_of(region.ymax);
        let row1 = self.row_of(region.ymin);
        let extent = BBox::new(
            self.extent.xmin + col0 as Scalar * self.dx,
            self.extent.ymax - (row1 + 1) as Scalar * self.dy,
            self.extent.xmin + (col1 + 1) as Scalar * self.dx,
            self.extent.ymax - row0 as Scalar * self.dy,
        );
        Grid {
            extent,
            dx: self.dx,
            dy: self.dy,
            rows: row1 - row0 + 1,
            cols: col1 - col0 + 1,
        }
    }

    /// Full-grid rows above a sub-grid derived from this grid.
    pub fn row_offset(&self, sub: &Grid) -> usize {
        ((self.extent.ymax - sub.extent.ymax) / self.dy).round() as usize
    }

    /// Full-grid columns left of a sub-grid derived from this grid.
    pub fn col_offset(&self, sub: &Grid) -> usize {
        ((sub.extent.xmin - self.extent.xmin) / self.dx).round() as usize
    }
}

/// Infinite-extent view of a [`Grid`]: indices are shifted by one and the
/// virtual rows/columns 0 and `n + 1` address padding cells reaching to
/// infinity on the outward side.
#[derive(Debug, Clone, Copy)]
pub struct PaddedGrid {
    inner: Grid,
}

impl PaddedGrid {
    pub fn new(inner: Grid) -> Self {
        Self { inner }
    }

    /// Rows including both padding rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.inner.rows() + 2
    }

    /// Columns including both padding columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.inner.cols() + 2
    }

    /// Padded row containing `y`; 0 above the grid, `rows() - 1` below.
    pub fn row_of(&self, y: Scalar) -> usize {
        let extent = self.inner.extent();
        if y > extent.ymax {
            0
        } else if y < extent.ymin {
            self.rows() - 1
        } else {
            1 + self.inner.row_of(y)
        }
    }

    /// Padded column containing `x`; 0 left of the grid, `cols() - 1` right.
    pub fn col_of(&self, x: Scalar) -> usize {
        let extent = self.inner.extent();
        if x > extent.xmax {
            self.cols() - 1
        } else if x < extent.xmin {
            0
        } else {
            1 + self.inner.col_of(x)
        }
    }

    /// Cell box at padded `(row, col)`; padding cells are unbounded outward.
    pub fn cell(&self, row: usize, col: usize) -> BBox {
        let extent = self.inner.extent();
        let (dx, dy) = (self.inner.dx(), self.inner.dy());
        let xmin = if col == 0 {
            Scalar::NEG_INFINITY
        } else {
            extent.xmin + (col - 1) as Scalar * dx
        };
        let xmax = if col >= self.cols() - 1 {
            Scalar::INFINITY
        } else {
            extent.xmin + col as Scalar * dx
        };
        let ymax = if row == 0 {
            Scalar::INFINITY
        } else {
            extent.ymax - (row - 1) as Scalar * dy
        };
        let ymin = if row >= self.rows() - 1 {
            Scalar::NEG_INFINITY
        } else {
            extent.ymax - row as Scalar * dy
        };
        BBox::new(xmin, ymin, xmax, ymax)
    }
}

//! Planar primitives shared by the walker, the coverage kernels and the grid
use std::fmt;

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq)]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        write!(f, "{},{}", x, y)
    }
}

impl Point {
    #[inline]
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(&self) -> Scalar {
        self.0[0]
    }

    /// Get `y` component of the point
    #[inline]
    pub fn y(&self) -> Scalar {
        self.0[1]
    }

    /// Distance between two points
    pub fn dist(self, other: Self) -> Scalar {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        (x0 - x1).hypot(y0 - y1)
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

/// Which side of a cell box a boundary point lies on.
///
/// `Side::None` means the point is strictly interior (or not on the box at
/// all); a traversal whose entry side is `None` started inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    None,
    Left,
    Right,
    Top,
    Bottom,
}

/// Classification of a point against a cell box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// Where a segment leaves a cell: the interpolated point on the box
/// boundary and the side that contains it.
#[derive(Debug, Clone, Copy)]
pub struct Crossing {
    pub side: Side,
    pub coord: Point,
}

/// Axis-aligned rectangle. Doubles as grid extent and as a single cell box;
/// padding cells of the infinite-extent grid carry `±inf` on their outward
/// sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub xmin: Scalar,
    pub ymin: Scalar,
    pub xmax: Scalar,
    pub ymax: Scalar,
}

impl BBox {
    pub fn new(xmin: Scalar, ymin: Scalar, xmax: Scalar, ymax: Scalar) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    #[inline]
    pub fn width(&self) -> Scalar {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> Scalar {
        self.ymax - self.ymin
    }

    #[inline]
    pub fn area(&self) -> Scalar {
        self.width() * self.height()
    }

    #[inline]
    pub fn perimeter(&self) -> Scalar {
        2.0 * (self.width() + self.height())
    }

    /// Determine if the point is inside or on the boundary
    pub fn contains(&self, p: Point) -> bool {
        self.xmin <= p.x() && p.x() <= self.xmax && self.ymin <= p.y() && p.y() <= self.ymax
    }

    /// Determine if the point is strictly inside
    pub fn strictly_contains(&self, p: Point) -> bool {
        self.xmin < p.x() && p.x() < self.xmax && self.ymin < p.y() && p.y() < self.ymax
    }

    pub fn locate(&self, p: Point) -> Location {
        if self.strictly_contains(p) {
            Location::Inside
        } else if self.contains(p) {
            Location::Boundary
        } else {
            Location::Outside
        }
    }

    /// Side of the box the point lies on, `Side::None` when not on the
    /// boundary. Corner points resolve to Left/Right before Bottom/Top.
    pub fn side(&self, p: Point) -> Side {
        if p.x() == self.xmin {
            Side::Left
        } else if p.x() == self.xmax {
            Side::Right
        } else if p.y() == self.ymin {
            Side::Bottom
        } else if p.y() == self.ymax {
            Side::Top
        } else {
            Side::None
        }
    }

    /// Extend the box so it contains `other`
    pub fn union(&self, other: BBox) -> Self {
        Self {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Find the intersection of two boxes, `None` when disjoint. Boxes that
    /// merely touch intersect in a degenerate (zero width or height) box.
    pub fn intersect(&self, other: BBox) -> Option<BBox> {
        let (xmin, xmax) = range_intersect(self.xmin, self.xmax, other.xmin, other.xmax)?;
        let (ymin, ymax) = range_intersect(self.ymin, self.ymax, other.ymin, other.ymax)?;
        Some(BBox::new(xmin, ymin, xmax, ymax))
    }

    /// Where the segment `a -> b` leaves this box.
    ///
    /// `b` must be outside the box; `a` is normally inside or on the
    /// boundary but may itself be outside when the caller re-anchors the
    /// segment at its original start coordinate to avoid cancellation on
    /// tiny geometry. For each box side the segment crosses moving outward,
    /// the segment parameter `t` is computed and the crossing with the
    /// smallest `t` wins. Candidates are scanned Top, Bottom, Left, Right
    /// and replaced only on strictly smaller `t`, so exact corner ties
    /// resolve to Top/Bottom.
    pub fn crossing(&self, a: Point, b: Point) -> Crossing {
        let dx = b.x() - a.x();
        let dy = b.y() - a.y();

        let mut best: Option<(Scalar, Crossing)> = None;
        let mut consider = |t: Scalar, side: Side, coord: Point| {
            if !(0.0..=1.0).contains(&t) {
                return;
            }
            match best {
                Some((t_best, _)) if t >= t_best => {}
                _ => best = Some((t, Crossing { side, coord })),
            }
        };

        if b.y() > self.ymax && dy > 0.0 {
            let t = (self.ymax - a.y()) / dy;
            let x = a.x() + t * dx;
            if x >= self.xmin && x <= self.xmax {
                consider(t, Side::Top, Point::new(x, self.ymax));
            }
        }
        if b.y() < self.ymin && dy < 0.0 {
            let t = (self.ymin - a.y()) / dy;
            let x = a.x() + t * dx;
            if x >= self.xmin && x <= self.xmax {
                consider(t, Side::Bottom, Point::new(x, self.ymin));
            }
        }
        if b.x() < self.xmin && dx < 0.0 {
            let t = (self.xmin - a.x()) / dx;
            let y = a.y() + t * dy;
            if y >= self.ymin && y <= self.ymax {
                consider(t, Side::Left, Point::new(self.xmin, y));
            }
        }
        if b.x() > self.xmax && dx > 0.0 {
            let t = (self.xmax - a.x()) / dx;
            let y = a.y() + t * dy;
            if y >= self.ymin && y <= self.ymax {
                consider(t, Side::Right, Point::new(self.xmax, y));
            }
        }

        match best {
            Some((_, crossing)) => crossing,
            None => {
                // degenerate corner graze: clamp the target onto the box
                let coord = Point::new(
                    b.x().clamp(self.xmin, self.xmax),
                    b.y().clamp(self.ymin, self.ymax),
                );
                Crossing {
                    side: self.side(coord),
                    coord,
                }
            }
        }
    }
}

/// Find intersection of two ranges
fn range_intersect(
    r0_min: Scalar,
    r0_max: Scalar,
    r1_min: Scalar,
    r1_max: Scalar,
) -> Option<(Scalar, Scalar)> {
    if r0_min > r1_max || r1_min > r0_max {
        None
    } else {
        Some((r0_min.max(r1_min), r0_max.min(r1_max)))
    }
}

/// Arc length along the box boundary from the bottom-left corner to a
/// boundary point, walking left side up, then top, right side down, bottom.
/// Corners sit at BL=0, TL=h, TR=h+w, BR=2h+w.
pub fn perimeter_distance(bbox: &BBox, p: Point) -> Scalar {
    if p.x() == bbox.xmin {
        p.y() - bbox.ymin
    } else if p.y() == bbox.ymax {
        bbox.height() + (p.x() - bbox.xmin)
    } else if p.x() == bbox.xmax {
        bbox.height() + bbox.width() + (bbox.ymax - p.y())
    } else {
        2.0 * bbox.height() + bbox.width() + (bbox.xmax - p.x())
    }
}

/// Signed shoelace area of a ring, positive for counter-clockwise winding.
///
/// Summed as a triangle fan anchored at the first vertex, with every
/// coordinate shifted by that vertex before multiplying; this keeps the
/// summation stable for small rings far from the origin and is exact for
/// both closed (first == last) and open rings.
pub fn signed_area(ring: &[Point]) -> Scalar {
    if ring.len() < 3 {
        return 0.0;
    }
    let Point([x0, y0]) = ring[0];
    let mut sum = 0.0;
    for i in 1..ring.len() - 1 {
        let ax = ring[i].x() - x0;
        let ay = ring[i].y() - y0;
        let bx = ring[i + 1].x() - x0;
        let by = ring[i + 1].y() - y0;
        sum += ax * by - ay * bx;
    }
    sum / 2.0
}

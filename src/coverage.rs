//! Covered-fraction kernels
//!
//! For a counter-clockwise traversal the covered region of a cell lies to
//! the left of the travel direction. Its boundary is the traversal path
//! plus the part of the cell boundary walked clockwise (decreasing
//! perimeter distance) from the exit point back to the entry point,
//! inserting cell corners along the way. Three paths: a closed ring held
//! entirely by one cell (plain shoelace), the analytical single-traversal
//! construction, and chain chasing over several traversals.
use crate::{perimeter_distance, signed_area, BBox, Point, Scalar};

/// Separates "corner inside the clockwise arc" from "at the corner".
const CORNER_TOL: Scalar = 1e-12;

/// Coverage fraction of a closed ring that never left the cell.
pub fn closed_ring_covered_fraction(bbox: &BBox, ring: &[Point]) -> Scalar {
    let cell_area = bbox.area();
    if cell_area <= 0.0 {
        return 0.0;
    }
    signed_area(ring).abs() / cell_area
}

/// Coverage fraction of a single traversal through a cell.
///
/// The traversal enters at `coords[0]` and exits at the final coordinate,
/// both on the cell boundary. When entry and exit coincide the traversal
/// closes on itself and is measured directly.
pub fn analytical_covered_fraction(bbox: &BBox, coords: &[Point]) -> Scalar {
    let cell_area = bbox.area();
    if cell_area <= 0.0 || coords.len() < 2 {
        return 0.0;
    }
    let perimeter = bbox.perimeter();
    let entry_pd = perimeter_distance(bbox, coords[0]);
    let exit_pd = perimeter_distance(bbox, coords[coords.len() - 1]);

    let arc = if exit_pd > entry_pd + CORNER_TOL {
        exit_pd - entry_pd
    } else if entry_pd > exit_pd + CORNER_TOL {
        perimeter - entry_pd + exit_pd
    } else {
        return (signed_area(coords).abs() / cell_area).clamp(0.0, 1.0);
    };

    let mut polygon: Vec<Point> = Vec::with_capacity(coords.len() + 4);
    polygon.extend_from_slice(coords);
    push_arc_corners(&mut polygon, bbox, exit_pd, arc, perimeter);

    (signed_area(&polygon).abs() / cell_area).clamp(0.0, 1.0)
}

/// Total area to the left of a set of traversal chains through one cell.
///
/// Each chain starts and ends on the cell boundary (a chain that starts
/// and ends at the same point is a closed loop). Starting from any
/// unconsumed chain, the boundary is walked clockwise from the chain's
/// exit to the nearest unconsumed chain entry, corners inserted along the
/// way, until the polygon closes; signed areas of all closed polygons are
/// summed. With a single chain this reduces to the analytical
/// single-traversal construction.
pub fn left_hand_area(bbox: &BBox, chains: &[&[Point]]) -> Scalar {
    let chains: Vec<&[Point]> = chains.iter().copied().filter(|c| c.len() >= 2).collect();
    let perimeter = bbox.perimeter();

    struct Chain {
        start: Scalar,
        stop: Scalar,
        visited: bool,
    }
    let mut meta: Vec<Chain> = chains
        .iter()
        .map(|c| Chain {
            start: perimeter_distance(bbox, c[0]),
            stop: perimeter_distance(bbox, c[c.len() - 1]),
            visited: false,
        })
        .collect();

    let mut total = 0.0;
    for first in 0..meta.len() {
        if meta[first].visited {
            continue;
        }
        let mut polygon: Vec<Point> = Vec::new();
        let mut cur = first;
        loop {
            meta[cur].visited = true;
            polygon.extend_from_slice(chains[cur]);
            let position = meta[cur].stop;

            // next chain: the entry nearest clockwise from this exit; the
            // starting chain is always a candidate so the polygon can close
            let mut next = first;
            let mut next_d = cw_distance(position, meta[first].start, perimeter);
            for (j, chain) in meta.iter().enumerate() {
                if chain.visited {
                    continue;
                }
                let d = cw_distance(position, chain.start, perimeter);
                if d < next_d {
                    next_d = d;
                    next = j;
                }
            }

            push_arc_corners(&mut polygon, bbox, position, next_d, perimeter);
            if next == first {
                break;
            }
            cur = next;
        }
        total += signed_area(&polygon);
    }
    total
}

/// Clockwise (decreasing perimeter distance) arc length from `from` to `to`.
fn cw_distance(from: Scalar, to: Scalar, perimeter: Scalar) -> Scalar {
    let d = from - to;
    if d < 0.0 {
        d + perimeter
    } else {
        d
    }
}

/// Append the cell corners lying strictly inside the clockwise arc of
/// length `arc` starting at `from_pd`, nearest first.
fn push_arc_corners(
    polygon: &mut Vec<Point>,
    bbox: &BBox,
    from_pd: Scalar,
    arc: Scalar,
    perimeter: Scalar,
) {
    let (w, h) = (bbox.width(), bbox.height());
    let corners = [
        (Point::new(bbox.xmin, bbox.ymin), 0.0),
        (Point::new(bbox.xmin, bbox.ymax), h),
        (Point::new(bbox.xmax, bbox.ymax), h + w),
        (Point::new(bbox.xmax, bbox.ymin), 2.0 * h + w),
    ];

    let mut in_arc: Vec<(Scalar, Point)> = Vec::with_capacity(4);
    for (corner, pd) in corners {
        let d = cw_distance(from_pd, pd, perimeter);
        if d > CORNER_TOL && d < arc - CORNER_TOL {
            in_arc.push((d, corner));
        }
    }
    in_arc.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    polygon.extend(in_arc.into_iter().map(|(_, corner)| corner));
}

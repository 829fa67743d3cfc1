//! Polygon model consumed by the burn drivers
//!
//! The core works on plain coordinate sequences: a [`Ring`] is a closed
//! sequence of points, a [`Polygon`] is an exterior ring plus holes, and
//! [`Geometry`] groups polygons the way multi-polygons and geometry
//! collections do. External geometry libraries plug in through the
//! [`ToGeometry`] seam; adapters for `geo-types` are provided below.
use crate::{signed_area, BBox, Point, Scalar};
use std::fmt;

/// Geometry type tag, mirroring what the drivers decompose over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Polygon,
    MultiPolygon,
    Collection,
}

/// Closed ring of coordinates, first equals last, at least four entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    coords: Vec<Point>,
}

impl Ring {
    pub fn new(coords: Vec<Point>) -> Result<Self, GeometryError> {
        if coords.len() < 4 {
            return Err(GeometryError::TooFewCoordinates(coords.len()));
        }
        if coords[0] != coords[coords.len() - 1] {
            return Err(GeometryError::OpenRing);
        }
        Ok(Self { coords })
    }

    /// Build a ring from `(x, y)` pairs, closing it when necessary.
    pub fn from_xy(xy: &[(Scalar, Scalar)]) -> Result<Self, GeometryError> {
        let mut coords: Vec<Point> = xy.iter().map(|&p| p.into()).collect();
        if coords.len() >= 3 && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0]);
        }
        Self::new(coords)
    }

    #[inline]
    pub fn coords(&self) -> &[Point] {
        &self.coords
    }

    /// Ring orientation by shoelace sign.
    pub fn is_ccw(&self) -> bool {
        signed_area(&self.coords) > 0.0
    }

    /// Signed shoelace area of the ring.
    pub fn area(&self) -> Scalar {
        signed_area(&self.coords)
    }

    /// Bounding box of the ring coordinates.
    pub fn bbox(&self) -> BBox {
        let p0 = self.coords[0];
        let mut b = BBox::new(p0.x(), p0.y(), p0.x(), p0.y());
        for p in &self.coords[1..] {
            b.xmin = b.xmin.min(p.x());
            b.ymin = b.ymin.min(p.y());
            b.xmax = b.xmax.max(p.x());
            b.ymax = b.ymax.max(p.y());
        }
        b
    }
}

/// Exterior ring plus interior rings (holes).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    #[inline]
    pub fn exterior(&self) -> &Ring {
        &self.exterior
    }

    #[inline]
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Bounding box of every ring, exterior first.
    pub fn ring_boxes(&self) -> Vec<BBox> {
        let mut boxes = Vec::with_capacity(1 + self.holes.len());
        boxes.push(self.exterior.bbox());
        boxes.extend(self.holes.iter().map(Ring::bbox));
        boxes
    }
}

/// A polygonal geometry: single polygon, multi-polygon, or a collection of
/// either.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    Collection(Vec<Geometry>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::Collection(_) => GeometryKind::Collection,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Polygon(_) => false,
            Geometry::MultiPolygon(polys) => polys.is_empty(),
            Geometry::Collection(geoms) => geoms.iter().all(Geometry::is_empty),
        }
    }

    /// Number of direct children (1 for a plain polygon).
    pub fn num_geometries(&self) -> usize {
        match self {
            Geometry::Polygon(_) => 1,
            Geometry::MultiPolygon(polys) => polys.len(),
            Geometry::Collection(geoms) => geoms.len(),
        }
    }

    /// Every polygon component, collections flattened depth-first.
    pub fn polygons(&self) -> Vec<&Polygon> {
        let mut out = Vec::new();
        self.collect_polygons(&mut out);
        out
    }

    fn collect_polygons<'a>(&'a self, out: &mut Vec<&'a Polygon>) {
        match self {
            Geometry::Polygon(p) => out.push(p),
            Geometry::MultiPolygon(polys) => out.extend(polys.iter()),
            Geometry::Collection(geoms) => {
                for g in geoms {
                    g.collect_polygons(out);
                }
            }
        }
    }
}

/// Failure while building or accessing polygon geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Ring is not closed (first coordinate differs from last)
    OpenRing,
    /// Ring has fewer coordinates than a closed ring requires
    TooFewCoordinates(usize),
    /// Geometry is not polygonal
    NotAreal(&'static str),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::OpenRing => write!(f, "ring is not closed"),
            GeometryError::TooFewCoordinates(n) => {
                write!(f, "ring needs at least 4 coordinates, got {}", n)
            }
            GeometryError::NotAreal(kind) => write!(f, "geometry is not polygonal: {}", kind),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Conversion into the crate's polygon model, fallible per input geometry.
pub trait ToGeometry {
    fn to_geometry(&self) -> Result<Geometry, GeometryError>;
}

impl ToGeometry for Geometry {
    fn to_geometry(&self) -> Result<Geometry, GeometryError> {
        Ok(self.clone())
    }
}

impl<T: ToGeometry + ?Sized> ToGeometry for &T {
    fn to_geometry(&self) -> Result<Geometry, GeometryError> {
        (**self).to_geometry()
    }
}

fn ring_from_geo(line: &geo_types::LineString<Scalar>) -> Result<Ring, GeometryError> {
    Ring::new(line.0.iter().map(|c| Point::new(c.x, c.y)).collect())
}

fn polygon_from_geo(poly: &geo_types::Polygon<Scalar>) -> Result<Option<Polygon>, GeometryError> {
    if poly.exterior().0.is_empty() {
        return Ok(None);
    }
    let exterior = ring_from_geo(poly.exterior())?;
    let holes = poly
        .interiors()
        .iter()
        .map(ring_from_geo)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Polygon::new(exterior, holes)))
}

impl ToGeometry for geo_types::Polygon<Scalar> {
    fn to_geometry(&self) -> Result<Geometry, GeometryError> {
        match polygon_from_geo(self)? {
            Some(poly) => Ok(Geometry::Polygon(poly)),
            None => Ok(Geometry::MultiPolygon(Vec::new())),
        }
    }
}

impl ToGeometry for geo_types::MultiPolygon<Scalar> {
    fn to_geometry(&self) -> Result<Geometry, GeometryError> {
        let polys = self
            .0
            .iter()
            .map(polygon_from_geo)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Geometry::MultiPolygon(polys.into_iter().flatten().collect()))
    }
}

impl ToGeometry for geo_types::GeometryCollection<Scalar> {
    fn to_geometry(&self) -> Result<Geometry, GeometryError> {
        let geoms = self
            .0
            .iter()
            .map(ToGeometry::to_geometry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Geometry::Collection(geoms))
    }
}

impl ToGeometry for geo_types::Geometry<Scalar> {
    fn to_geometry(&self) -> Result<Geometry, GeometryError> {
        match self {
            geo_types::Geometry::Polygon(p) => p.to_geometry(),
            geo_types::Geometry::MultiPolygon(mp) => mp.to_geometry(),
            geo_types::Geometry::GeometryCollection(gc) => gc.to_geometry(),
            geo_types::Geometry::Point(_) => Err(GeometryError::NotAreal("Point")),
            geo_types::Geometry::Line(_) => Err(GeometryError::NotAreal("Line")),
            geo_types::Geometry::LineString(_) => Err(GeometryError::NotAreal("LineString")),
            geo_types::Geometry::MultiPoint(_) => Err(GeometryError::NotAreal("MultiPoint")),
            geo_types::Geometry::MultiLineString(_) => {
                Err(GeometryError::NotAreal("MultiLineString"))
            }
            geo_types::Geometry::Rect(_) => Err(GeometryError::NotAreal("Rect")),
            geo_types::Geometry::Triangle(_) => Err(GeometryError::NotAreal("Triangle")),
        }
    }
}

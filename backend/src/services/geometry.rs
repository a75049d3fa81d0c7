//! Planar geometry for the nazotte (draw-an-area) search.
//!
//! Points live in the (latitude, longitude) plane; latitude is treated as x and
//! longitude as y. No projection is applied.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Smallest box covering `points`; `None` for an empty slice.
    pub fn enclosing(points: &[Coordinate]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_latitude: first.latitude,
            max_latitude: first.latitude,
            min_longitude: first.longitude,
            max_longitude: first.longitude,
        };
        Some(points.iter().skip(1).fold(init, |b, p| Self {
            min_latitude: b.min_latitude.min(p.latitude),
            max_latitude: b.max_latitude.max(p.latitude),
            min_longitude: b.min_longitude.min(p.longitude),
            max_longitude: b.max_longitude.max(p.longitude),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Coordinate>,
}

impl Polygon {
    /// Repeated consecutive vertices are collapsed and a closing vertex equal
    /// to the first one is dropped. Returns `None` when fewer than three
    /// distinct vertices remain or a vertex is not finite.
    pub fn new(mut vertices: Vec<Coordinate>) -> Option<Self> {
        if vertices
            .iter()
            .any(|v| !v.latitude.is_finite() || !v.longitude.is_finite())
        {
            return None;
        }
        vertices.dedup();
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let distinct = vertices
            .iter()
            .enumerate()
            .filter(|(i, v)| !vertices[..*i].contains(*v))
            .count();
        if distinct < 3 {
            return None;
        }
        Some(Self { vertices })
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    pub fn bounding_box(&self) -> BoundingBox {
        // new() guarantees at least three vertices
        BoundingBox::enclosing(&self.vertices).unwrap_or(BoundingBox {
            min_latitude: 0.0,
            max_latitude: 0.0,
            min_longitude: 0.0,
            max_longitude: 0.0,
        })
    }

    /// Even-odd rule. Points exactly on an edge are outside.
    pub fn contains(&self, point: Coordinate) -> bool {
        let (x, y) = (point.latitude, point.longitude);
        let n = self.vertices.len();

        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if on_segment(a, b, point) {
                return false;
            }
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.vertices[i].latitude, self.vertices[i].longitude);
            let (xj, yj) = (self.vertices[j].latitude, self.vertices[j].longitude);
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Well-known-text rendering, ring closed.
    pub fn to_wkt(&self) -> String {
        let ring: Vec<String> = self
            .vertices
            .iter()
            .chain(self.vertices.first())
            .map(|c| format!("{:.6} {:.6}", c.latitude, c.longitude))
            .collect();
        format!("POLYGON(({}))", ring.join(","))
    }
}

fn on_segment(a: Coordinate, b: Coordinate, p: Coordinate) -> bool {
    let cross = (b.latitude - a.latitude) * (p.longitude - a.longitude)
        - (b.longitude - a.longitude) * (p.latitude - a.latitude);
    if cross.abs() > f64::EPSILON {
        return false;
    }
    p.latitude >= a.latitude.min(b.latitude)
        && p.latitude <= a.latitude.max(b.latitude)
        && p.longitude >= a.longitude.min(b.longitude)
        && p.longitude <= a.longitude.max(b.longitude)
}

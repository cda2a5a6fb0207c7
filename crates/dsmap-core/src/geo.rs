//! Geographic primitives: positions and bounding boxes.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a GeoJSON `[lon, lat]` position.
    pub fn from_position(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }

    /// GeoJSON `[lon, lat]` position.
    pub fn to_position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Planar point with `x = lng`, `y = lat`.
    pub fn to_point(self) -> Point {
        Point::new(self.lng, self.lat)
    }

    /// Check equality within a tolerance in degrees.
    pub fn approx_eq(&self, other: &LatLng, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }
}

/// Axis-aligned geographic bounding box.
///
/// Stored as a `kurbo::Rect` where x spans longitude and y spans latitude.
/// A box built from a single position has zero area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    rect: Rect,
}

impl LatLngBounds {
    /// Bounds covering exactly one position.
    pub fn from_latlng(latlng: LatLng) -> Self {
        let p = latlng.to_point();
        Self {
            rect: Rect::from_points(p, p),
        }
    }

    /// Bounds spanning two corners, in any order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            rect: Rect::from_points(a.to_point(), b.to_point()),
        }
    }

    /// Smallest bounds containing every position, or `None` if there are none.
    pub fn from_latlngs<I: IntoIterator<Item = LatLng>>(latlngs: I) -> Option<Self> {
        let mut iter = latlngs.into_iter();
        let first = Self::from_latlng(iter.next()?);
        Some(iter.fold(first, |acc, ll| acc.extend(ll)))
    }

    /// Union of several bounds, or `None` if the iterator is empty.
    pub fn union_all<I: IntoIterator<Item = LatLngBounds>>(bounds: I) -> Option<Self> {
        bounds.into_iter().reduce(|acc, b| acc.union(b))
    }

    pub fn union(self, other: LatLngBounds) -> Self {
        Self {
            rect: self.rect.union(other.rect),
        }
    }

    /// Grow to include a position.
    pub fn extend(self, latlng: LatLng) -> Self {
        Self {
            rect: self.rect.union_pt(latlng.to_point()),
        }
    }

    pub fn south(&self) -> f64 {
        self.rect.y0
    }

    pub fn north(&self) -> f64 {
        self.rect.y1
    }

    pub fn west(&self) -> f64 {
        self.rect.x0
    }

    pub fn east(&self) -> f64 {
        self.rect.x1
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south(), self.west())
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north(), self.east())
    }

    pub fn center(&self) -> LatLng {
        let c = self.rect.center();
        LatLng::new(c.y, c.x)
    }

    /// True when the bounds collapse to a single position.
    pub fn is_point(&self) -> bool {
        self.rect.width() == 0.0 && self.rect.height() == 0.0
    }

    pub fn contains(&self, latlng: LatLng) -> bool {
        let p = latlng.to_point();
        p.x >= self.rect.x0 && p.x <= self.rect.x1 && p.y >= self.rect.y0 && p.y <= self.rect.y1
    }

    /// Underlying planar rectangle (x = lng, y = lat).
    pub fn as_rect(&self) -> Rect {
        self.rect
    }
}

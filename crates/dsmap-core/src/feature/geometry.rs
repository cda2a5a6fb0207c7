//! GeoJSON geometry types.

use crate::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

/// A GeoJSON position in `[lon, lat]` order.
///
/// Extra elements (altitude) are accepted on input and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position(pub [f64; 2]);

impl Position {
    pub fn lng(&self) -> f64 {
        self.0[0]
    }

    pub fn lat(&self) -> f64 {
        self.0[1]
    }

    pub fn to_latlng(self) -> LatLng {
        LatLng::from_position(self.0)
    }
}

impl From<LatLng> for Position {
    fn from(ll: LatLng) -> Self {
        Self(ll.to_position())
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lng, lat, ..] => Ok(Self([*lng, *lat])),
            _ => Err(format!(
                "position needs at least two numbers, got {}",
                value.len()
            )),
        }
    }
}

impl From<Position> for Vec<f64> {
    fn from(p: Position) -> Self {
        p.0.to_vec()
    }
}

/// Vector geometry of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    pub fn point(latlng: LatLng) -> Self {
        Geometry::Point {
            coordinates: latlng.into(),
        }
    }

    pub fn line_string<I: IntoIterator<Item = LatLng>>(latlngs: I) -> Self {
        Geometry::LineString {
            coordinates: latlngs.into_iter().map(Position::from).collect(),
        }
    }

    /// Single-ring polygon. The ring is closed if the caller left it open.
    pub fn polygon<I: IntoIterator<Item = LatLng>>(ring: I) -> Self {
        let mut ring: Vec<Position> = ring.into_iter().map(Position::from).collect();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if ring.len() > 1 && first != last {
                ring.push(first);
            }
        }
        Geometry::Polygon {
            coordinates: vec![ring],
        }
    }

    /// Axis-aligned rectangle, as produced by the rectangle draw tool.
    pub fn rectangle(bounds: LatLngBounds) -> Self {
        let sw = bounds.south_west();
        let ne = bounds.north_east();
        Self::polygon([
            sw,
            LatLng::new(ne.lat, sw.lng),
            ne,
            LatLng::new(sw.lat, ne.lng),
        ])
    }

    /// GeoJSON type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// True for a single point (a marker).
    pub fn is_point(&self) -> bool {
        matches!(self, Geometry::Point { .. })
    }

    /// All positions in document order.
    pub fn positions(&self) -> Vec<LatLng> {
        let flat = |ps: &[Position]| ps.iter().map(|p| p.to_latlng()).collect::<Vec<_>>();
        match self {
            Geometry::Point { coordinates } => vec![coordinates.to_latlng()],
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                flat(coordinates)
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates.iter().flat_map(|line| flat(line)).collect()
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .flat_map(|ring| flat(ring))
                .collect(),
        }
    }

    /// Bounding box, or `None` for a geometry without positions.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_latlngs(self.positions())
    }

    /// Position-wise equality within a tolerance in degrees.
    pub fn approx_eq(&self, other: &Geometry, tolerance: f64) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        let a = self.positions();
        let b = other.positions();
        a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.approx_eq(y, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_wire_format() {
        let g = Geometry::point(LatLng::new(51.5, -0.09));
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"], serde_json::json!([-0.09, 51.5]));
    }

    #[test]
    fn test_position_with_altitude() {
        let g: Geometry =
            serde_json::from_str(r#"{"type":"Point","coordinates":[1.0,2.0,300.0]}"#).unwrap();
        assert_eq!(g, Geometry::point(LatLng::new(2.0, 1.0)));
    }

    #[test]
    fn test_short_position_rejected() {
        let r: Result<Geometry, _> =
            serde_json::from_str(r#"{"type":"Point","coordinates":[1.0]}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let r: Result<Geometry, _> =
            serde_json::from_str(r#"{"type":"Circle","coordinates":[1.0,2.0]}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_polygon_closes_ring() {
        let g = Geometry::polygon([
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
        ]);
        let Geometry::Polygon { coordinates } = &g else {
            panic!("expected polygon");
        };
        assert_eq!(coordinates[0].len(), 4);
        assert_eq!(coordinates[0][0], coordinates[0][3]);
    }

    #[test]
    fn test_rectangle_bounds() {
        let bounds = LatLngBounds::from_corners(LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0));
        let g = Geometry::rectangle(bounds);
        assert_eq!(g.kind(), "Polygon");
        assert_eq!(g.bounds(), Some(bounds));
    }

    #[test]
    fn test_multipolygon_bounds() {
        let g: Geometry = serde_json::from_str(
            r#"{"type":"MultiPolygon","coordinates":[
                [[[0,0],[0,1],[1,1],[0,0]]],
                [[[5,5],[5,6],[6,6],[5,5]]]
            ]}"#,
        )
        .unwrap();
        let b = g.bounds().unwrap();
        assert_eq!(b.south_west(), LatLng::new(0.0, 0.0));
        assert_eq!(b.north_east(), LatLng::new(6.0, 6.0));
    }

    #[test]
    fn test_empty_line_has_no_bounds() {
        let g = Geometry::line_string(Vec::new());
        assert!(g.bounds().is_none());
    }
}

//! Vector features placed on the map.

mod geometry;
mod style;

pub use geometry::{Geometry, Position};
pub use style::{
    DRAWN_FILL_OPACITY, FeatureStyle, HexColor, StyleError, StyleProperty, StyleValue,
};

use crate::geo::LatLngBounds;
use crate::layer_group::GroupId;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for features.
pub type FeatureId = Uuid;

/// One vector geometry with its style and group membership.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub(crate) id: FeatureId,
    pub geometry: Geometry,
    pub style: FeatureStyle,
    /// Free-form GeoJSON properties carried through import and export.
    pub properties: Map<String, Value>,
    /// Owning group. Rewritten whenever the feature is inserted into a group.
    pub(crate) group: GroupId,
}

impl Feature {
    /// Create a feature that does not yet belong to a group.
    pub fn new(geometry: Geometry, style: FeatureStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
            style,
            properties: Map::new(),
            group: Uuid::nil(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Group this feature currently belongs to.
    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.geometry.bounds()
    }

    pub fn is_marker(&self) -> bool {
        self.geometry.is_point()
    }
}

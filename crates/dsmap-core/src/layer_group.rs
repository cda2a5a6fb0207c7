//! Named, independently visible collections of features.

use crate::feature::{Feature, FeatureId};
use crate::geo::LatLngBounds;
use uuid::Uuid;

/// Unique identifier for layer groups.
pub type GroupId = Uuid;

/// Label given to groups created without an explicit name.
pub const DEFAULT_GROUP_LABEL: &str = "New Group";

/// A named collection of features that can be shown or hidden as one.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGroup {
    id: GroupId,
    /// Display name. Not required to be unique.
    pub label: String,
    features: Vec<Feature>,
    /// Whether the group is attached to the view.
    pub visible: bool,
    /// Whether new drawings go into this group. Maintained by the session.
    pub(crate) active: bool,
    /// Sidebar disclosure state only.
    pub expanded: bool,
}

impl LayerGroup {
    /// Create an empty, visible, inactive group.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            features: Vec::new(),
            visible: true,
            active: false,
            expanded: true,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of features in the group.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features in insertion order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Append a feature, taking ownership and pointing its back-reference here.
    pub fn add_feature(&mut self, mut feature: Feature) -> FeatureId {
        feature.group = self.id;
        let id = feature.id;
        self.features.push(feature);
        id
    }

    pub fn remove_feature(&mut self, id: FeatureId) -> Option<Feature> {
        let pos = self.features.iter().position(|f| f.id == id)?;
        Some(self.features.remove(pos))
    }

    pub fn get_feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn get_feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.get_feature(id).is_some()
    }

    /// Union of all feature bounds, or `None` if no feature has positions.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::union_all(self.features.iter().filter_map(Feature::bounds))
    }
}

impl Default for LayerGroup {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_LABEL)
    }
}

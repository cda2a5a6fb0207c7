//! Session configuration.

use crate::feature::{DRAWN_FILL_OPACITY, HexColor};
use crate::geo::LatLng;
use crate::layer_group::DEFAULT_GROUP_LABEL;
use crate::view::DrawControlOptions;
use serde::{Deserialize, Serialize};

/// Title given to new maps.
pub const DEFAULT_MAP_TITLE: &str = "New Map";

/// Zoom level of a fresh session.
pub const DEFAULT_ZOOM: f64 = 6.0;

/// A tile layer the user can pick as background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseMap {
    pub name: String,
    /// Tile URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
    pub url: String,
    pub attribution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
}

impl BaseMap {
    pub fn street() -> Self {
        Self {
            name: "Street".to_string(),
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"http://osm.org/copyright\">OpenStreetMap</a> contributors"
                .to_string(),
            max_zoom: None,
        }
    }

    pub fn satellite() -> Self {
        Self {
            name: "Satellite".to_string(),
            url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                .to_string(),
            attribution: "&copy;".to_string(),
            max_zoom: Some(18),
        }
    }
}

/// Settings applied when a map session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub title: String,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub default_group_label: String,
    /// Fill color of new drawings.
    pub primary_color: HexColor,
    /// Stroke color of new drawings.
    pub secondary_color: HexColor,
    pub drawn_fill_opacity: f64,
    pub base_maps: Vec<BaseMap>,
    pub draw_control: DrawControlOptions,
    /// Ask the presentation layer to hide page chrome around the map.
    pub full_screen: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_MAP_TITLE.to_string(),
            initial_center: LatLng::new(51.505, -0.09),
            initial_zoom: DEFAULT_ZOOM,
            default_group_label: DEFAULT_GROUP_LABEL.to_string(),
            primary_color: HexColor::red(),
            secondary_color: HexColor::red(),
            drawn_fill_opacity: DRAWN_FILL_OPACITY,
            base_maps: vec![BaseMap::street(), BaseMap::satellite()],
            draw_control: DrawControlOptions::default(),
            full_screen: true,
        }
    }
}

impl SessionConfig {
    /// Load from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

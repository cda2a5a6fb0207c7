//! Scene serialization to and from the portable JSON backup format.
//!
//! An export is a GeoJSON `FeatureCollection` tagged with `"ds_map": true`
//! whose entries are themselves feature collections, one per layer group:
//!
//! ```json
//! { "type": "FeatureCollection", "ds_map": true,
//!   "features": [ { "type": "FeatureCollection", "label": "Sites", "features": [...] } ] }
//! ```
//!
//! Any plain GeoJSON document is also accepted on import and read as a
//! single flat layer.

use crate::feature::{Feature, FeatureStyle, Geometry};
use crate::layer_group::LayerGroup;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// File name used for exported scenes.
pub const EXPORT_FILE_NAME: &str = "backup.json";

/// MIME type of exported scenes.
pub const EXPORT_CONTENT_TYPE: &str = "application/json";

/// Field marking a multi-layer export.
pub const MARKER_FIELD: &str = "ds_map";

/// Feature property holding the serialized path style.
pub const STYLE_PROPERTY: &str = "style";

/// Scene serialization errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// One layer of a parsed multi-layer export.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLayer {
    pub label: Option<String>,
    pub features: Vec<Feature>,
}

/// A fully parsed import, ready to be applied to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneDocument {
    /// A `ds_map` export: one entry per layer group.
    Layers(Vec<ParsedLayer>),
    /// A plain GeoJSON document.
    Flat(Vec<Feature>),
}

impl SceneDocument {
    /// Total number of features across all layers.
    pub fn feature_count(&self) -> usize {
        match self {
            SceneDocument::Layers(layers) => layers.iter().map(|l| l.features.len()).sum(),
            SceneDocument::Flat(features) => features.len(),
        }
    }
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    ds_map: bool,
    features: Vec<LayerCollection<'a>>,
}

#[derive(Serialize)]
struct LayerCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    label: &'a str,
    features: Vec<FeatureObject<'a>>,
}

#[derive(Serialize)]
struct FeatureObject<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: Map<String, Value>,
    geometry: &'a Geometry,
}

fn feature_object(feature: &Feature) -> SceneResult<FeatureObject<'_>> {
    let mut properties = feature.properties.clone();
    let style = serde_json::to_value(&feature.style)
        .map_err(|e| SceneError::Serialize(e.to_string()))?;
    properties.insert(STYLE_PROPERTY.to_string(), style);
    Ok(FeatureObject {
        kind: "Feature",
        properties,
        geometry: &feature.geometry,
    })
}

/// Serialize layer groups into a `ds_map` document.
pub fn export_scene(groups: &[LayerGroup]) -> SceneResult<String> {
    let features = groups
        .iter()
        .map(|lg| {
            Ok(LayerCollection {
                kind: "FeatureCollection",
                label: &lg.label,
                features: lg
                    .features()
                    .iter()
                    .map(feature_object)
                    .collect::<SceneResult<_>>()?,
            })
        })
        .collect::<SceneResult<_>>()?;

    let doc = ExportDocument {
        kind: "FeatureCollection",
        ds_map: true,
        features,
    };
    serde_json::to_string(&doc).map_err(|e| SceneError::Serialize(e.to_string()))
}

/// Parse an import without touching any session state.
pub fn parse_scene(bytes: &[u8]) -> SceneResult<SceneDocument> {
    let root: Value = serde_json::from_slice(bytes)
        .map_err(|e| SceneError::Parse(format!("Invalid JSON: {}", e)))?;

    if root.get(MARKER_FIELD).is_some_and(truthy) {
        let entries = root
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| SceneError::Parse("Missing 'features' array".to_string()))?;
        let layers = entries
            .iter()
            .map(|entry| {
                let mut features = Vec::new();
                collect_features(entry, &mut features)?;
                Ok(ParsedLayer {
                    label: entry.get("label").and_then(Value::as_str).map(str::to_string),
                    features,
                })
            })
            .collect::<SceneResult<_>>()?;
        Ok(SceneDocument::Layers(layers))
    } else {
        let mut features = Vec::new();
        collect_features(&root, &mut features)?;
        Ok(SceneDocument::Flat(features))
    }
}

/// Loose truthiness, matching how the marker was historically tested.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Flatten any GeoJSON object into features, in document order.
fn collect_features(value: &Value, out: &mut Vec<Feature>) -> SceneResult<()> {
    if let Some(items) = value.as_array() {
        for item in items {
            collect_features(item, out)?;
        }
        return Ok(());
    }

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SceneError::Parse("GeoJSON object without 'type'".to_string()))?;

    match kind {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| SceneError::Parse("Missing 'features' array".to_string()))?;
            for f in features {
                collect_features(f, out)?;
            }
        }
        "Feature" => {
            if let Some(feature) = parse_feature(value)? {
                out.push(feature);
            }
        }
        "GeometryCollection" => {
            let geometries = value
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| SceneError::Parse("Missing 'geometries' array".to_string()))?;
            for g in geometries {
                collect_features(g, out)?;
            }
        }
        _ => out.push(Feature::new(parse_geometry(value)?, FeatureStyle::default())),
    }
    Ok(())
}

fn parse_geometry(value: &Value) -> SceneResult<Geometry> {
    Geometry::deserialize(value).map_err(|e| SceneError::Parse(format!("Invalid geometry: {}", e)))
}

fn parse_feature(value: &Value) -> SceneResult<Option<Feature>> {
    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => {
            log::debug!("Skipping feature without geometry");
            return Ok(None);
        }
        Some(g) => parse_geometry(g)?,
    };

    let mut properties = match value.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let style = match properties.remove(STYLE_PROPERTY) {
        Some(raw) => serde_json::from_value(raw).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable feature style: {}", e);
            FeatureStyle::default()
        }),
        None => FeatureStyle::default(),
    };

    let mut feature = Feature::new(geometry, style);
    feature.properties = properties;
    Ok(Some(feature))
}

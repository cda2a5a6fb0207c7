//! dsmap Core Library
//!
//! Platform-agnostic core for the dsmap annotation map: layer groups of
//! GeoJSON features, image geotagging, scene import/export and the session
//! controller that ties them to a map view.

pub mod config;
pub mod event;
pub mod feature;
pub mod geo;
pub mod geotag;
pub mod layer_group;
pub mod scene;
pub mod session;
pub mod storage;
pub mod view;

pub use config::{BaseMap, SessionConfig};
pub use event::{MapEvent, Notification, NotificationLevel};
pub use feature::{Feature, FeatureId, FeatureStyle, Geometry, HexColor, StyleProperty, StyleValue};
pub use geo::{LatLng, LatLngBounds};
pub use geotag::{ExifTagReader, GeoTagError, GpsTags, ImageFile, TagReader};
pub use layer_group::{GroupId, LayerGroup};
pub use scene::{SceneDocument, SceneError, export_scene, parse_scene};
pub use session::{ImageBatchReport, ImportSummary, MapSession, SessionError, SessionResult};
pub use storage::{FileSink, MemorySink, SaveError};
pub use view::{DrawControlOptions, HeadlessView, MapView, ViewFrame};

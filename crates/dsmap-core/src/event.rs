//! Events delivered to a map session and notifications it emits.

use crate::feature::{FeatureId, Geometry};
use crate::geo::LatLng;
use std::fmt;

/// Something that happened in the view or the file picker.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The drawing control finished a shape.
    DrawCreated { geometry: Geometry },
    /// The drawing control finished editing a shape.
    DrawEdited { feature: FeatureId, geometry: Geometry },
    /// The drawing control removed a shape.
    DrawDeleted { feature: FeatureId },
    FeatureClicked { feature: FeatureId },
    MouseMoved { latlng: LatLng },
    /// A scene file finished reading.
    SceneFileRead { bytes: Vec<u8> },
    /// One image of a batch finished reading. Batches complete in any order.
    ImageRead { name: String, bytes: Vec<u8> },
}

impl MapEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::DrawCreated { .. } => "draw:created",
            MapEvent::DrawEdited { .. } => "draw:edited",
            MapEvent::DrawDeleted { .. } => "draw:deleted",
            MapEvent::FeatureClicked { .. } => "click",
            MapEvent::MouseMoved { .. } => "mousemove",
            MapEvent::SceneFileRead { .. } => "scene:read",
            MapEvent::ImageRead { .. } => "image:read",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        write!(f, "[{}] {}", level, self.message)
    }
}

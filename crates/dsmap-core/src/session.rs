//! Map session: layer groups, selection and drawing state.

use crate::config::SessionConfig;
use crate::event::{MapEvent, Notification};
use crate::feature::{
    Feature, FeatureId, FeatureStyle, Geometry, HexColor, StyleError, StyleProperty, StyleValue,
};
use crate::geo::{LatLng, LatLngBounds};
use crate::geotag::{self, ExifTagReader, GeoTagError, ImageFile, TagReader};
use crate::layer_group::{GroupId, LayerGroup};
use crate::scene::{self, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME, SceneDocument, SceneError};
use crate::storage::{FileSink, SaveError};
use crate::view::MapView;
use thiserror::Error;

/// Feature property holding the source file name of an image marker.
pub const IMAGE_PROPERTY: &str = "image";

/// Session operation errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    GeoTag(#[from] GeoTagError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("Unknown layer group: {0}")]
    UnknownGroup(GroupId),
    #[error("Unknown feature: {0}")]
    UnknownFeature(FeatureId),
    #[error("Feature {0} has no positions")]
    EmptyGeometry(FeatureId),
    #[error("No feature selected")]
    NoSelection,
    #[error("No active layer group")]
    NoActiveGroup,
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// What an import added to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub groups_created: usize,
    pub features_added: usize,
}

/// Outcome of placing a batch of images.
#[derive(Debug, Default)]
pub struct ImageBatchReport {
    /// Image name and the marker placed for it.
    pub placed: Vec<(String, FeatureId)>,
    /// Image name and why it was skipped.
    pub skipped: Vec<(String, GeoTagError)>,
}

/// The state of one open map.
///
/// Exactly one layer group is active at any time, and new drawings always
/// land in it. All mutation goes through `&mut self`.
pub struct MapSession<V: MapView> {
    config: SessionConfig,
    /// Map title.
    pub title: String,
    view: V,
    tag_reader: Box<dyn TagReader>,
    groups: Vec<LayerGroup>,
    active: GroupId,
    selected: Option<FeatureId>,
    /// Fill color of new drawings.
    primary_color: HexColor,
    /// Stroke color of new drawings.
    secondary_color: HexColor,
    mouse: Option<LatLng>,
    notifications: Vec<Notification>,
}

impl<V: MapView> MapSession<V> {
    /// Start a session with one visible, active group bound to the draw control.
    pub fn new(config: SessionConfig, view: V) -> Self {
        let mut group = LayerGroup::new(config.default_group_label.clone());
        group.active = true;
        let active = group.id();

        let mut session = Self {
            title: config.title.clone(),
            primary_color: config.primary_color,
            secondary_color: config.secondary_color,
            config,
            view,
            tag_reader: Box::new(ExifTagReader),
            groups: vec![group],
            active,
            selected: None,
            mouse: None,
            notifications: Vec::new(),
        };
        session.view.add_layer(active);
        session
            .view
            .bind_draw_control(active, &session.config.draw_control);
        log::info!("Session '{}' started", session.title);
        session
    }

    /// Replace the image metadata reader.
    pub fn with_tag_reader(mut self, reader: impl TagReader + 'static) -> Self {
        self.tag_reader = Box::new(reader);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Layer groups in creation order. The first is the default group.
    pub fn layer_groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    pub fn layer_group(&self, id: GroupId) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn active_group_id(&self) -> GroupId {
        self.active
    }

    pub fn active_layer_group(&self) -> Option<&LayerGroup> {
        self.layer_group(self.active)
    }

    pub fn selected_feature_id(&self) -> Option<FeatureId> {
        self.selected
    }

    pub fn selected_feature(&self) -> Option<&Feature> {
        self.selected.and_then(|id| self.feature(id))
    }

    pub fn primary_color(&self) -> HexColor {
        self.primary_color
    }

    pub fn secondary_color(&self) -> HexColor {
        self.secondary_color
    }

    pub fn set_primary_color(&mut self, color: HexColor) {
        self.primary_color = color;
    }

    pub fn set_secondary_color(&mut self, color: HexColor) {
        self.secondary_color = color;
    }

    /// Last pointer position over the map.
    pub fn mouse_coordinates(&self) -> Option<LatLng> {
        self.mouse
    }

    /// Find a feature in any group.
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.groups.iter().find_map(|g| g.get_feature(id))
    }

    /// Total number of features across all groups.
    pub fn feature_count(&self) -> usize {
        self.groups.iter().map(LayerGroup::feature_count).sum()
    }

    fn group_index(&self, id: GroupId) -> SessionResult<usize> {
        self.groups
            .iter()
            .position(|g| g.id() == id)
            .ok_or(SessionError::UnknownGroup(id))
    }

    fn active_index(&self) -> SessionResult<usize> {
        self.groups
            .iter()
            .position(|g| g.id() == self.active)
            .ok_or(SessionError::NoActiveGroup)
    }

    fn feature_mut(&mut self, id: FeatureId) -> SessionResult<&mut Feature> {
        self.groups
            .iter_mut()
            .find_map(|g| g.get_feature_mut(id))
            .ok_or(SessionError::UnknownFeature(id))
    }

    /// Add a group with the default label and make it active.
    pub fn create_layer_group(&mut self) -> GroupId {
        let group = LayerGroup::new(self.config.default_group_label.clone());
        let id = group.id();
        self.groups.push(group);
        self.view.add_layer(id);
        log::debug!("Created layer group {}", id);
        // The group was just pushed, so selection cannot fail.
        if let Err(e) = self.select_active_layer_group(id) {
            log::error!("Failed to activate new group: {}", e);
        }
        id
    }

    /// Make `id` the target of new drawings, showing it if hidden.
    pub fn select_active_layer_group(&mut self, id: GroupId) -> SessionResult<()> {
        let index = self.group_index(id)?;
        if let Ok(previous) = self.active_index() {
            self.groups[previous].active = false;
        }

        let group = &mut self.groups[index];
        group.active = true;
        group.visible = true;
        self.active = id;

        self.view.add_layer(id);
        self.view.bind_draw_control(id, &self.config.draw_control);
        log::debug!("Active layer group is now '{}'", self.groups[index].label);
        Ok(())
    }

    /// Show or hide a group. Hidden groups keep their features.
    pub fn set_visibility(&mut self, id: GroupId, visible: bool) -> SessionResult<()> {
        let index = self.group_index(id)?;
        self.groups[index].visible = visible;
        if visible {
            self.view.add_layer(id);
        } else {
            self.view.remove_layer(id);
        }
        Ok(())
    }

    /// Flip a group's visibility. Returns the new state.
    pub fn toggle_visibility(&mut self, id: GroupId) -> SessionResult<bool> {
        let visible = !self.groups[self.group_index(id)?].visible;
        self.set_visibility(id, visible)?;
        Ok(visible)
    }

    pub fn rename_layer_group(
        &mut self,
        id: GroupId,
        label: impl Into<String>,
    ) -> SessionResult<()> {
        let index = self.group_index(id)?;
        self.groups[index].label = label.into();
        Ok(())
    }

    /// Sidebar disclosure state; no effect on the map.
    pub fn set_expanded(&mut self, id: GroupId, expanded: bool) -> SessionResult<()> {
        let index = self.group_index(id)?;
        self.groups[index].expanded = expanded;
        Ok(())
    }

    /// Add a freshly drawn shape to the active group.
    pub fn on_draw_created(&mut self, geometry: Geometry) -> SessionResult<FeatureId> {
        let mut style = FeatureStyle::drawn(self.primary_color, self.secondary_color);
        style.fill_opacity = self.config.drawn_fill_opacity;
        let id = self.add_to_active(Feature::new(geometry, style))?;
        log::debug!("Drew feature {}", id);
        Ok(id)
    }

    fn add_to_active(&mut self, feature: Feature) -> SessionResult<FeatureId> {
        let index = self.active_index()?;
        let group = &mut self.groups[index];
        let group_id = group.id();
        let id = group.add_feature(feature);
        if let Some(feature) = group.get_feature(id) {
            self.view.add_feature(group_id, feature);
        }
        Ok(id)
    }

    /// Replace the geometry of an edited shape, keeping its style and group.
    pub fn edit_feature_geometry(
        &mut self,
        id: FeatureId,
        geometry: Geometry,
    ) -> SessionResult<()> {
        let feature = self.feature_mut(id)?;
        feature.geometry = geometry;
        let feature = feature.clone();
        self.view.refresh_feature(&feature);
        Ok(())
    }

    /// Remove a feature from whichever group owns it.
    pub fn delete_feature(&mut self, id: FeatureId) -> SessionResult<Feature> {
        let owner = self
            .feature(id)
            .map(Feature::group)
            .ok_or(SessionError::UnknownFeature(id))?;
        let index = self.group_index(owner)?;
        let feature = self.groups[index]
            .remove_feature(id)
            .ok_or(SessionError::UnknownFeature(id))?;

        self.view.remove_feature(id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("Deleted feature {} from '{}'", id, self.groups[index].label);
        Ok(feature)
    }

    /// Toggle selection of a clicked feature. Returns the new selection.
    pub fn on_feature_click(&mut self, id: FeatureId) -> SessionResult<Option<FeatureId>> {
        if self.feature(id).is_none() {
            return Err(SessionError::UnknownFeature(id));
        }
        self.selected = if self.selected == Some(id) {
            None
        } else {
            Some(id)
        };
        Ok(self.selected)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Frame a feature: tightly around a point, otherwise its bounding box.
    pub fn zoom_to(&mut self, id: FeatureId) -> SessionResult<LatLngBounds> {
        let feature = self.feature(id).ok_or(SessionError::UnknownFeature(id))?;
        let bounds = match &feature.geometry {
            Geometry::Point { coordinates } => LatLngBounds::from_latlng(coordinates.to_latlng()),
            geometry => geometry.bounds().ok_or(SessionError::EmptyGeometry(id))?,
        };
        self.view.fit_bounds(bounds);
        Ok(bounds)
    }

    /// Re-apply one style property of the selected feature and refresh it.
    pub fn update_layer_style(&mut self, property: StyleProperty) -> SessionResult<()> {
        let id = self.selected.ok_or(SessionError::NoSelection)?;
        let feature = self.feature_mut(id)?;
        let value = feature.style.get(property);
        feature.style.set(property, value)?;
        let feature = feature.clone();
        self.view.refresh_feature(&feature);
        Ok(())
    }

    /// Change one style property of the selected feature.
    pub fn set_style_property(
        &mut self,
        property: StyleProperty,
        value: StyleValue,
    ) -> SessionResult<()> {
        let id = self.selected.ok_or(SessionError::NoSelection)?;
        self.feature_mut(id)?.style.set(property, value)?;
        self.update_layer_style(property)
    }

    /// Serialize every group into a `ds_map` document.
    pub fn export_scene(&self) -> SessionResult<String> {
        Ok(scene::export_scene(&self.groups)?)
    }

    /// Export and hand the document to a sink as `backup.json`.
    pub fn save_scene(&self, sink: &mut dyn FileSink) -> SessionResult<()> {
        let json = self.export_scene()?;
        sink.save_file(EXPORT_FILE_NAME, EXPORT_CONTENT_TYPE, json.as_bytes())?;
        log::info!(
            "Exported {} groups, {} features",
            self.groups.len(),
            self.feature_count()
        );
        Ok(())
    }

    /// Import a document. Nothing changes unless the whole document parses.
    pub fn import_scene(&mut self, bytes: &[u8]) -> SessionResult<ImportSummary> {
        let document = scene::parse_scene(bytes)?;
        let mut summary = ImportSummary::default();

        match document {
            SceneDocument::Layers(layers) => {
                for layer in layers {
                    let label = layer
                        .label
                        .unwrap_or_else(|| self.config.default_group_label.clone());
                    let mut group = LayerGroup::new(label);
                    let group_id = group.id();
                    for feature in layer.features {
                        group.add_feature(feature);
                    }
                    summary.features_added += group.feature_count();
                    summary.groups_created += 1;

                    self.view.add_layer(group_id);
                    for feature in group.features() {
                        self.view.add_feature(group_id, feature);
                    }
                    self.groups.push(group);
                }
            }
            SceneDocument::Flat(features) => {
                let Some(first) = self.groups.first_mut() else {
                    return Err(SessionError::NoActiveGroup);
                };
                let group_id = first.id();
                for feature in features {
                    let id = first.add_feature(feature);
                    if let Some(feature) = first.get_feature(id) {
                        self.view.add_feature(group_id, feature);
                    }
                    summary.features_added += 1;
                }
            }
        }

        let bounds = LatLngBounds::union_all(self.groups.iter().filter_map(LayerGroup::bounds));
        if let Some(bounds) = bounds {
            self.view.fit_bounds(bounds);
        }
        log::info!(
            "Imported {} features into {} new groups",
            summary.features_added,
            summary.groups_created
        );
        Ok(summary)
    }

    /// Place a marker for one geotagged image in the active group.
    pub fn load_image(&mut self, name: &str, bytes: &[u8]) -> SessionResult<FeatureId> {
        let latlng = geotag::extract_location(self.tag_reader.as_ref(), bytes)?;
        self.place_image_marker(name, latlng)
    }

    fn place_image_marker(&mut self, name: &str, latlng: LatLng) -> SessionResult<FeatureId> {
        let feature = Feature::new(Geometry::point(latlng), FeatureStyle::default())
            .with_property(IMAGE_PROPERTY, name);
        let id = self.add_to_active(feature)?;
        log::debug!("Placed '{}' at {:.6},{:.6}", name, latlng.lat, latlng.lng);
        Ok(id)
    }

    /// Place markers for a batch of images. Each image is handled on its own.
    pub fn load_images(&mut self, files: &[ImageFile]) -> ImageBatchReport {
        let located = geotag::locate_batch(self.tag_reader.as_ref(), files);
        let mut report = ImageBatchReport::default();

        for (name, result) in located {
            let placed = result
                .map_err(SessionError::from)
                .and_then(|ll| self.place_image_marker(name, ll));
            match placed {
                Ok(id) => report.placed.push((name.to_string(), id)),
                Err(SessionError::GeoTag(e)) => {
                    log::warn!("Skipping '{}': {}", name, e);
                    self.notify(Notification::warning(format!("{}: {}", name, e)));
                    report.skipped.push((name.to_string(), e));
                }
                Err(e) => {
                    log::error!("Failed to place '{}': {}", name, e);
                    self.notify(Notification::error(format!("{}: {}", name, e)));
                }
            }
        }
        report
    }

    pub fn on_mouse_move(&mut self, latlng: LatLng) {
        self.mouse = Some(latlng);
    }

    /// Apply one view event. Failures are logged and queued as notifications.
    ///
    /// Returns `true` when the event applied cleanly.
    pub fn dispatch(&mut self, event: MapEvent) -> bool {
        let name = event.name();
        let result = match event {
            MapEvent::DrawCreated { geometry } => self.on_draw_created(geometry).map(|_| ()),
            MapEvent::DrawEdited { feature, geometry } => {
                self.edit_feature_geometry(feature, geometry)
            }
            MapEvent::DrawDeleted { feature } => self.delete_feature(feature).map(|_| ()),
            MapEvent::FeatureClicked { feature } => self.on_feature_click(feature).map(|_| ()),
            MapEvent::MouseMoved { latlng } => {
                self.on_mouse_move(latlng);
                Ok(())
            }
            MapEvent::SceneFileRead { bytes } => self.import_scene(&bytes).map(|summary| {
                self.notify(Notification::info(format!(
                    "Imported {} features",
                    summary.features_added
                )));
            }),
            MapEvent::ImageRead { name, bytes } => match self.load_image(&name, &bytes) {
                Err(SessionError::GeoTag(e)) => {
                    log::warn!("Skipping '{}': {}", name, e);
                    self.notify(Notification::warning(format!("{}: {}", name, e)));
                    return false;
                }
                other => other.map(|_| ()),
            },
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("{} failed: {}", name, e);
                self.notify(Notification::error(e.to_string()));
                false
            }
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Pending notifications, oldest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Take all pending notifications.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NotificationLevel;
    use crate::geotag::tests::FakeReader;
    use crate::storage::MemorySink;
    use crate::view::HeadlessView;
    use uuid::Uuid;

    fn session() -> MapSession<HeadlessView> {
        let config = SessionConfig::default();
        let view = HeadlessView::new(config.initial_center, config.initial_zoom);
        MapSession::new(config, view).with_tag_reader(FakeReader)
    }

    fn triangle() -> Geometry {
        Geometry::polygon([
            LatLng::new(0.0, 0.0),
            LatLng::new(1.0, 0.0),
            LatLng::new(1.0, 1.0),
        ])
    }

    fn active_count(session: &MapSession<HeadlessView>) -> usize {
        session.layer_groups().iter().filter(|g| g.is_active()).count()
    }

    #[test]
    fn test_new_session() {
        let s = session();
        assert_eq!(s.title, "New Map");
        assert_eq!(s.layer_groups().len(), 1);

        let group = &s.layer_groups()[0];
        assert!(group.is_active());
        assert!(group.visible);
        assert_eq!(group.label, "New Group");
        assert!(s.view().is_attached(group.id()));
        assert_eq!(s.view().draw_target(), Some(group.id()));
        assert_eq!(s.primary_color(), HexColor::red());
        assert!(s.selected_feature_id().is_none());
        assert!(s.mouse_coordinates().is_none());
    }

    #[test]
    fn test_exactly_one_active_group() {
        let mut s = session();
        let first = s.layer_groups()[0].id();
        let second = s.create_layer_group();
        assert_eq!(active_count(&s), 1);
        assert_eq!(s.active_group_id(), second);

        let third = s.create_layer_group();
        s.select_active_layer_group(first).unwrap();
        assert_eq!(active_count(&s), 1);
        assert!(s.layer_group(first).unwrap().is_active());

        s.select_active_layer_group(third).unwrap();
        s.select_active_layer_group(third).unwrap();
        assert_eq!(active_count(&s), 1);
        assert_eq!(s.view().draw_target(), Some(third));
    }

    #[test]
    fn test_select_unknown_group() {
        let mut s = session();
        let missing = Uuid::new_v4();
        assert!(matches!(
            s.select_active_layer_group(missing),
            Err(SessionError::UnknownGroup(id)) if id == missing
        ));
        assert_eq!(active_count(&s), 1);
    }

    #[test]
    fn test_select_shows_hidden_group() {
        let mut s = session();
        let first = s.layer_groups()[0].id();
        s.create_layer_group();
        s.set_visibility(first, false).unwrap();
        assert!(!s.view().is_attached(first));

        s.select_active_layer_group(first).unwrap();
        assert!(s.layer_group(first).unwrap().visible);
        assert!(s.view().is_attached(first));
    }

    #[test]
    fn test_toggle_visibility() {
        let mut s = session();
        let id = s.active_group_id();
        s.on_draw_created(triangle()).unwrap();

        assert!(!s.toggle_visibility(id).unwrap());
        assert!(!s.view().is_attached(id));
        assert_eq!(s.layer_group(id).unwrap().feature_count(), 1);

        assert!(s.toggle_visibility(id).unwrap());
        assert!(s.view().is_attached(id));
    }

    #[test]
    fn test_rename_and_expand() {
        let mut s = session();
        let id = s.active_group_id();
        s.rename_layer_group(id, "Trails").unwrap();
        s.set_expanded(id, false).unwrap();

        let group = s.layer_group(id).unwrap();
        assert_eq!(group.label, "Trails");
        assert!(!group.expanded);
    }

    #[test]
    fn test_draw_created_style() {
        let mut s = session();
        s.set_primary_color(HexColor::new(0, 255, 0));
        s.set_secondary_color(HexColor::new(0, 0, 255));

        let id = s.on_draw_created(triangle()).unwrap();
        let feature = s.feature(id).unwrap();
        assert_eq!(feature.style.fill_color, HexColor::new(0, 255, 0));
        assert_eq!(feature.style.color, HexColor::new(0, 0, 255));
        assert!((feature.style.fill_opacity - 0.8).abs() < 1e-9);
        assert_eq!(feature.group(), s.active_group_id());
        assert!(s.view().is_rendered(id));
    }

    #[test]
    fn test_draw_goes_to_active_group() {
        let mut s = session();
        let first = s.active_group_id();
        let second = s.create_layer_group();

        s.on_draw_created(triangle()).unwrap();
        assert_eq!(s.layer_group(first).unwrap().feature_count(), 0);
        assert_eq!(s.layer_group(second).unwrap().feature_count(), 1);
    }

    #[test]
    fn test_selection_toggle() {
        let mut s = session();
        let a = s.on_draw_created(triangle()).unwrap();
        let b = s.on_draw_created(triangle()).unwrap();

        assert_eq!(s.on_feature_click(a).unwrap(), Some(a));
        assert_eq!(s.on_feature_click(a).unwrap(), None);

        s.on_feature_click(a).unwrap();
        assert_eq!(s.on_feature_click(b).unwrap(), Some(b));
        assert_eq!(s.selected_feature().unwrap().id(), b);
    }

    #[test]
    fn test_click_unknown_feature() {
        let mut s = session();
        assert!(matches!(
            s.on_feature_click(Uuid::new_v4()),
            Err(SessionError::UnknownFeature(_))
        ));
        assert!(s.selected_feature_id().is_none());
    }

    #[test]
    fn test_delete_from_inactive_group() {
        let mut s = session();
        let first = s.active_group_id();
        let doomed = s.on_draw_created(triangle()).unwrap();
        let kept = s.on_draw_created(triangle()).unwrap();

        let second = s.create_layer_group();
        let other = s.on_draw_created(triangle()).unwrap();

        let removed = s.delete_feature(doomed).unwrap();
        assert_eq!(removed.id(), doomed);

        let first_group = s.layer_group(first).unwrap();
        assert_eq!(first_group.feature_count(), 1);
        assert!(first_group.contains(kept));
        assert_eq!(s.layer_group(second).unwrap().feature_count(), 1);
        assert!(s.layer_group(second).unwrap().contains(other));
        assert!(!s.view().is_rendered(doomed));
        assert!(s.view().is_rendered(kept));
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut s = session();
        let id = s.on_draw_created(triangle()).unwrap();
        s.on_feature_click(id).unwrap();

        s.delete_feature(id).unwrap();
        assert!(s.selected_feature_id().is_none());
        assert!(matches!(
            s.delete_feature(id),
            Err(SessionError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_zoom_to_point_and_polygon() {
        let mut s = session();
        let point = s.on_draw_created(Geometry::point(LatLng::new(48.0, 2.0))).unwrap();
        let bounds = s.zoom_to(point).unwrap();
        assert!(bounds.is_point());
        let frame = s.view().frame();
        assert!(frame.center.approx_eq(&LatLng::new(48.0, 2.0), 1e-9));
        assert_eq!(frame.zoom, s.view().max_zoom);

        let poly = s.on_draw_created(triangle()).unwrap();
        let bounds = s.zoom_to(poly).unwrap();
        assert_eq!(bounds.north(), 1.0);
        assert_eq!(bounds.east(), 1.0);
        assert!(s.view().frame().zoom < s.view().max_zoom);
    }

    #[test]
    fn test_style_updates_need_selection() {
        let mut s = session();
        s.on_draw_created(triangle()).unwrap();
        assert!(matches!(
            s.update_layer_style(StyleProperty::Color),
            Err(SessionError::NoSelection)
        ));
    }

    #[test]
    fn test_set_style_property() {
        let mut s = session();
        let id = s.on_draw_created(triangle()).unwrap();
        s.on_feature_click(id).unwrap();

        let before = s.view().refresh_count();
        s.set_style_property(StyleProperty::FillOpacity, StyleValue::Opacity(0.3))
            .unwrap();
        s.set_style_property(
            StyleProperty::Color,
            StyleValue::Color(HexColor::new(0x12, 0x34, 0x56)),
        )
        .unwrap();

        let style = &s.feature(id).unwrap().style;
        assert!((style.fill_opacity - 0.3).abs() < 1e-9);
        assert_eq!(style.color.to_string(), "#123456");
        assert_eq!(s.view().refresh_count(), before + 2);

        assert!(matches!(
            s.set_style_property(StyleProperty::FillOpacity, StyleValue::Opacity(1.5)),
            Err(SessionError::Style(_))
        ));
        s.update_layer_style(StyleProperty::FillColor).unwrap();
    }

    #[test]
    fn test_edit_geometry() {
        let mut s = session();
        let id = s.on_draw_created(triangle()).unwrap();
        let moved = Geometry::point(LatLng::new(5.0, 5.0));
        s.edit_feature_geometry(id, moved.clone()).unwrap();
        assert_eq!(s.feature(id).unwrap().geometry, moved);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut source = session();
        source.on_draw_created(triangle()).unwrap();
        let line = Geometry::line_string([LatLng::new(10.0, 20.0), LatLng::new(11.5, 21.25)]);
        source.on_draw_created(line).unwrap();
        source.create_layer_group();
        source.create_layer_group();
        source.on_draw_created(Geometry::point(LatLng::new(-33.9, 151.2))).unwrap();
        let json = source.export_scene().unwrap();

        let mut target = session();
        let summary = target.import_scene(json.as_bytes()).unwrap();
        assert_eq!(summary.groups_created, 3);
        assert_eq!(summary.features_added, 3);

        let imported = &target.layer_groups()[1..];
        assert_eq!(imported.len(), source.layer_groups().len());
        for (a, b) in source.layer_groups().iter().zip(imported) {
            assert_eq!(a.feature_count(), b.feature_count());
            assert_eq!(a.label, b.label);
            for (fa, fb) in a.features().iter().zip(b.features()) {
                assert!(fa.geometry.approx_eq(&fb.geometry, 1e-9));
                assert_eq!(fa.style, fb.style);
                assert_eq!(fb.group(), b.id());
            }
            assert!(!b.is_active());
            assert!(target.view().is_attached(b.id()));
        }
        assert_eq!(active_count(&target), 1);
        assert_eq!(target.view().rendered_count(), 3);
    }

    #[test]
    fn test_legacy_import_into_first_group() {
        let mut s = session();
        let first = s.active_group_id();
        s.on_draw_created(triangle()).unwrap();
        s.create_layer_group();

        let doc = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[2.35,48.85]}},
            {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}},
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[-0.12,51.5]}}
        ]}"#;
        let summary = s.import_scene(doc).unwrap();

        assert_eq!(summary.features_added, 3);
        assert_eq!(summary.groups_created, 0);
        assert_eq!(s.layer_groups().len(), 2);
        assert_eq!(s.layer_group(first).unwrap().feature_count(), 4);
        assert_eq!(s.layer_groups()[1].feature_count(), 0);
    }

    #[test]
    fn test_legacy_import_into_hidden_group() {
        let mut s = session();
        let first = s.active_group_id();
        s.create_layer_group();
        s.set_visibility(first, false).unwrap();

        let doc = br#"{"type":"Point","coordinates":[2.35,48.85]}"#;
        s.import_scene(doc).unwrap();
        let id = s.layer_group(first).unwrap().features()[0].id();
        assert!(s.view().has_feature(id));
        assert!(!s.view().is_rendered(id));

        s.set_visibility(first, true).unwrap();
        assert!(s.view().is_rendered(id));
    }

    #[test]
    fn test_import_fits_view() {
        let mut s = session();
        let doc = br#"{"type":"MultiPoint","coordinates":[[10,10],[20,30]]}"#;
        s.import_scene(doc).unwrap();

        let center = s.view().frame().center;
        assert!((center.lng - 15.0).abs() < 1e-9);
        assert!((center.lat - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_import_leaves_state() {
        let mut s = session();
        s.on_draw_created(triangle()).unwrap();
        let before = s.export_scene().unwrap();

        assert!(matches!(
            s.import_scene(b"{not json"),
            Err(SessionError::Scene(SceneError::Parse(_)))
        ));
        assert!(s.import_scene(br#"{"type":"Unknown"}"#).is_err());
        assert_eq!(s.export_scene().unwrap(), before);
        assert_eq!(s.layer_groups().len(), 1);
    }

    #[test]
    fn test_save_scene() {
        let mut s = session();
        s.on_draw_created(triangle()).unwrap();
        let mut sink = MemorySink::new();
        s.save_scene(&mut sink).unwrap();

        let file = sink.get("backup.json").unwrap();
        assert_eq!(file.content_type, "application/json");
        let doc: serde_json::Value = serde_json::from_slice(&file.contents).unwrap();
        assert_eq!(doc["ds_map"], true);
        assert_eq!(doc["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_load_image_places_marker() {
        let mut s = session();
        let id = s.load_image("harbor.jpg", b"40 30 0,N,74 0 36,W").unwrap();

        let feature = s.feature(id).unwrap();
        assert!(feature.is_marker());
        assert_eq!(feature.properties[IMAGE_PROPERTY], "harbor.jpg");
        let ll = feature.geometry.positions()[0];
        assert!((ll.lat - 40.5).abs() < 1e-9);
        assert!((ll.lng + 74.01).abs() < 1e-9);
        assert!(matches!(
            s.load_image("blank.jpg", b"nothing"),
            Err(SessionError::GeoTag(GeoTagError::NoGeoTag))
        ));
    }

    #[test]
    fn test_image_batch_independence() {
        let mut s = session();
        let files = vec![
            ImageFile::new("one.jpg", b"10 0 0,N,20 0 0,E".to_vec()),
            ImageFile::new("two.jpg", b"no gps here".to_vec()),
            ImageFile::new("three.jpg", b"30 0 0,S,40 0 0,W".to_vec()),
        ];
        let report = s.load_images(&files);

        let placed: Vec<&str> = report.placed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(placed, vec!["one.jpg", "three.jpg"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "two.jpg");
        assert_eq!(s.active_layer_group().unwrap().feature_count(), 2);

        let notes = s.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Warning);
        assert!(s.notifications().is_empty());
    }

    #[test]
    fn test_dispatch_events() {
        let mut s = session();
        assert!(s.dispatch(MapEvent::DrawCreated { geometry: triangle() }));
        let id = s.active_layer_group().unwrap().features()[0].id();

        assert!(s.dispatch(MapEvent::FeatureClicked { feature: id }));
        assert_eq!(s.selected_feature_id(), Some(id));

        assert!(s.dispatch(MapEvent::MouseMoved { latlng: LatLng::new(1.0, 2.0) }));
        assert_eq!(s.mouse_coordinates(), Some(LatLng::new(1.0, 2.0)));

        assert!(s.dispatch(MapEvent::DrawDeleted { feature: id }));
        assert_eq!(s.feature_count(), 0);
        assert!(s.notifications().is_empty());
    }

    #[test]
    fn test_dispatch_recovers_errors() {
        let mut s = session();
        assert!(!s.dispatch(MapEvent::SceneFileRead { bytes: b"garbage".to_vec() }));
        assert!(!s.dispatch(MapEvent::ImageRead {
            name: "two.jpg".to_string(),
            bytes: b"no gps".to_vec(),
        }));
        assert!(s.dispatch(MapEvent::ImageRead {
            name: "three.jpg".to_string(),
            bytes: b"1 0 0,N,1 0 0,E".to_vec(),
        }));
        assert!(!s.dispatch(MapEvent::FeatureClicked { feature: Uuid::new_v4() }));

        let levels: Vec<NotificationLevel> =
            s.drain_notifications().into_iter().map(|n| n.level).collect();
        assert_eq!(
            levels,
            vec![
                NotificationLevel::Error,
                NotificationLevel::Warning,
                NotificationLevel::Error
            ]
        );
        assert_eq!(s.feature_count(), 1);
    }

    #[test]
    fn test_dispatch_import_notifies() {
        let mut s = session();
        let doc = br#"{"type":"Point","coordinates":[1,2]}"#.to_vec();
        assert!(s.dispatch(MapEvent::SceneFileRead { bytes: doc }));

        let notes = s.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Info);
        assert_eq!(notes[0].message, "Imported 1 features");
    }
}

//! Map view collaborator.
//!
//! The session never renders anything itself. It drives a [`MapView`], which
//! in a browser wraps the tile map and its drawing control, and natively is
//! usually the in-process [`HeadlessView`].

use crate::feature::{Feature, FeatureId};
use crate::geo::{LatLng, LatLngBounds};
use crate::layer_group::GroupId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Side length of a map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the web mercator projection.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Operations the session needs from the map and its drawing control.
pub trait MapView {
    /// Attach a group's feature layer to the map.
    fn add_layer(&mut self, group: GroupId);

    /// Detach a group's feature layer from the map.
    fn remove_layer(&mut self, group: GroupId);

    /// Add a feature to a group's layer. It shows while that group is attached.
    fn add_feature(&mut self, group: GroupId, feature: &Feature);

    fn remove_feature(&mut self, feature: FeatureId);

    /// Redraw a feature after its style changed.
    fn refresh_feature(&mut self, feature: &Feature);

    /// Frame the view around the given bounds.
    fn fit_bounds(&mut self, bounds: LatLngBounds);

    /// Replace the drawing control so it edits the given group.
    fn bind_draw_control(&mut self, group: GroupId, options: &DrawControlOptions);
}

/// Corner of the map holding a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Configuration of the drawing control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawControlOptions {
    pub position: ControlPosition,
    pub polyline: bool,
    pub polygon: bool,
    pub rectangle: bool,
    pub circle: bool,
    pub marker: bool,
    /// Allow editing shapes of the bound group.
    pub edit: bool,
    /// Allow deleting shapes of the bound group.
    pub remove: bool,
}

impl Default for DrawControlOptions {
    fn default() -> Self {
        Self {
            position: ControlPosition::TopRight,
            polyline: true,
            polygon: true,
            rectangle: true,
            circle: false,
            marker: true,
            edit: true,
            remove: true,
        }
    }
}

/// Visible part of the map: center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewFrame {
    pub center: LatLng,
    pub zoom: f64,
}

/// Web mercator y of a latitude, in radians of arc.
fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (PI / 4.0 + lat / 2.0).tan().ln()
}

/// View state kept in memory instead of on a screen.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    /// Groups attached to the map, in attach order.
    attached: Vec<GroupId>,
    /// Features added to a group layer, keyed to that group.
    rendered: HashMap<FeatureId, GroupId>,
    draw_target: Option<GroupId>,
    draw_options: DrawControlOptions,
    frame: ViewFrame,
    /// Viewport size in pixels.
    pub viewport: (f64, f64),
    pub min_zoom: f64,
    pub max_zoom: f64,
    refreshes: usize,
}

impl HeadlessView {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            attached: Vec::new(),
            rendered: HashMap::new(),
            draw_target: None,
            draw_options: DrawControlOptions::default(),
            frame: ViewFrame { center, zoom },
            viewport: (1024.0, 768.0),
            min_zoom: 0.0,
            max_zoom: 18.0,
            refreshes: 0,
        }
    }

    pub fn frame(&self) -> ViewFrame {
        self.frame
    }

    pub fn is_attached(&self, group: GroupId) -> bool {
        self.attached.contains(&group)
    }

    pub fn attached_groups(&self) -> &[GroupId] {
        &self.attached
    }

    /// Whether the feature is in some group layer, attached or not.
    pub fn has_feature(&self, feature: FeatureId) -> bool {
        self.rendered.contains_key(&feature)
    }

    /// Whether the feature is on screen: in a layer whose group is attached.
    pub fn is_rendered(&self, feature: FeatureId) -> bool {
        self.rendered
            .get(&feature)
            .is_some_and(|group| self.attached.contains(group))
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered
            .values()
            .filter(|group| self.attached.contains(group))
            .count()
    }

    /// Group the drawing control currently edits.
    pub fn draw_target(&self) -> Option<GroupId> {
        self.draw_target
    }

    pub fn draw_options(&self) -> &DrawControlOptions {
        &self.draw_options
    }

    /// Number of style refreshes requested so far.
    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    /// Largest integer zoom at which the bounds fit in the viewport.
    pub fn zoom_for_bounds(&self, bounds: LatLngBounds) -> f64 {
        if bounds.is_point() {
            return self.max_zoom;
        }
        let (width, height) = self.viewport;
        let fx = (bounds.east() - bounds.west()) / 360.0;
        let fy = (mercator_y(bounds.north()) - mercator_y(bounds.south())) / (2.0 * PI);
        let zx = (width / (TILE_SIZE * fx)).log2();
        let zy = (height / (TILE_SIZE * fy)).log2();
        zx.min(zy).floor().clamp(self.min_zoom, self.max_zoom)
    }
}

impl MapView for HeadlessView {
    fn add_layer(&mut self, group: GroupId) {
        if !self.attached.contains(&group) {
            self.attached.push(group);
        }
    }

    fn remove_layer(&mut self, group: GroupId) {
        self.attached.retain(|&g| g != group);
    }

    fn add_feature(&mut self, group: GroupId, feature: &Feature) {
        self.rendered.insert(feature.id(), group);
    }

    fn remove_feature(&mut self, feature: FeatureId) {
        self.rendered.remove(&feature);
    }

    fn refresh_feature(&mut self, _feature: &Feature) {
        self.refreshes += 1;
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) {
        self.frame = ViewFrame {
            center: bounds.center(),
            zoom: self.zoom_for_bounds(bounds),
        };
        log::debug!(
            "View framed at {:.5},{:.5} zoom {}",
            self.frame.center.lat,
            self.frame.center.lng,
            self.frame.zoom
        );
    }

    fn bind_draw_control(&mut self, group: GroupId, options: &DrawControlOptions) {
        self.draw_target = Some(group);
        self.draw_options = options.clone();
    }
}

//! Map adapter over a third-party interactive map.
//!
//! [`MapSurface`] is the slice of the map library the widget needs.
//! [`MapAdapter`] layers the widget's camera rules and the single-popup
//! invariant on top. [`RecordingSurface`] is a surface that records every call
//! as a serializable [`MapCommand`] for a browser (or a test) to replay.

use serde::Serialize;

use retailmap_core::{Bounds, FeatureCollection, LngLat, RetailerFeature};

use crate::render;

/// Identifies a popup opened on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PopupHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitOptions {
    pub padding: u32,
    pub max_zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopupOptions {
    pub close_button: bool,
    pub close_on_click: bool,
    pub offset: u32,
}

pub trait MapSurface {
    /// Replaces the retailer pin source wholesale.
    fn set_source_data(&mut self, data: FeatureCollection);
    fn zoom(&self) -> f64;
    fn fly_to(&mut self, center: LngLat, zoom: f64);
    fn fit_bounds(&mut self, bounds: Bounds, options: FitOptions);
    fn add_popup(&mut self, at: LngLat, html: String, options: PopupOptions) -> PopupHandle;
    fn remove_popup(&mut self, handle: PopupHandle);
}

/// Camera and popup constants of the widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub initial_center: LngLat,
    pub initial_zoom: f64,
    /// Zoom floor when focusing a single retailer.
    pub focus_min_zoom: f64,
    /// Zoom used when a search finds no retailers around the origin.
    pub origin_zoom: f64,
    pub fit_padding: u32,
    pub fit_max_zoom: f64,
    pub popup_offset: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            initial_center: LngLat::new(-119.5, 37.2),
            initial_zoom: 5.4,
            focus_min_zoom: 11.0,
            origin_zoom: 10.0,
            fit_padding: 60,
            fit_max_zoom: 10.0,
            popup_offset: 25,
        }
    }
}

pub struct MapAdapter<S> {
    surface: S,
    camera: CameraSettings,
    active_popup: Option<PopupHandle>,
}

impl<S: MapSurface> MapAdapter<S> {
    pub fn new(surface: S, camera: CameraSettings) -> Self {
        Self {
            surface,
            camera,
            active_popup: None,
        }
    }

    pub fn camera(&self) -> &CameraSettings {
        &self.camera
    }

    pub fn set_pins(&mut self, features: &[RetailerFeature]) {
        self.surface
            .set_source_data(FeatureCollection::new(features.to_vec()));
    }

    /// Animates to `center`, never zooming out below `min_zoom`.
    pub fn fly_to(&mut self, center: LngLat, min_zoom: f64) {
        let zoom = self.surface.zoom().max(min_zoom);
        self.surface.fly_to(center, zoom);
    }

    /// Animates to `center` at exactly `zoom`.
    pub fn fly_to_zoom(&mut self, center: LngLat, zoom: f64) {
        self.surface.fly_to(center, zoom);
    }

    /// Fits the viewport to the features. Does nothing for an empty slice.
    pub fn fit_to_features(&mut self, features: &[RetailerFeature]) {
        let Some(bounds) = Bounds::from_points(features.iter().map(RetailerFeature::coordinates))
        else {
            return;
        };
        self.surface.fit_bounds(
            bounds,
            FitOptions {
                padding: self.camera.fit_padding,
                max_zoom: self.camera.fit_max_zoom,
            },
        );
    }

    /// Opens a popup for the feature, closing the previous one first.
    pub fn open_popup(&mut self, feature: &RetailerFeature) {
        self.close_popup();
        let html = render::render_popup(feature).into_string();
        let handle = self.surface.add_popup(
            feature.coordinates(),
            html,
            PopupOptions {
                close_button: true,
                close_on_click: false,
                offset: self.camera.popup_offset,
            },
        );
        self.active_popup = Some(handle);
    }

    pub fn close_popup(&mut self) {
        if let Some(handle) = self.active_popup.take() {
            self.surface.remove_popup(handle);
        }
    }

    /// Flies to the feature and opens its popup.
    pub fn focus(&mut self, feature: &RetailerFeature) {
        self.fly_to(feature.coordinates(), self.camera.focus_min_zoom);
        self.open_popup(feature);
    }

    #[must_use]
    pub fn active_popup(&self) -> Option<PopupHandle> {
        self.active_popup
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

/// One call against the map, in the order it was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapCommand {
    SetPins {
        data: FeatureCollection,
    },
    FlyTo {
        center: LngLat,
        zoom: f64,
        essential: bool,
    },
    FitBounds {
        bounds: [LngLat; 2],
        padding: u32,
        max_zoom: f64,
    },
    OpenPopup {
        id: PopupHandle,
        at: LngLat,
        html: String,
        close_button: bool,
        close_on_click: bool,
        offset: u32,
    },
    ClosePopup {
        id: PopupHandle,
    },
}

/// A map surface that records calls instead of drawing.
///
/// Zoom after `fit_bounds` is estimated from the box span, since the real
/// viewport size is unknown here.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    zoom: f64,
    pins: Vec<RetailerFeature>,
    open_popups: Vec<PopupHandle>,
    next_popup: u64,
    commands: Vec<MapCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            pins: Vec::new(),
            open_popups: Vec::new(),
            next_popup: 1,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn pins(&self) -> &[RetailerFeature] {
        &self.pins
    }

    #[must_use]
    pub fn open_popups(&self) -> &[PopupHandle] {
        &self.open_popups
    }

    #[must_use]
    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    /// Syncs the zoom with the real map's camera. Records nothing.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    /// Returns and clears the recorded commands.
    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }
}

fn estimate_fit_zoom(bounds: Bounds, max_zoom: f64) -> f64 {
    let span = (bounds.max.lng - bounds.min.lng)
        .max(bounds.max.lat - bounds.min.lat)
        .max(1e-6);
    (360.0 / span).log2().clamp(0.0, max_zoom)
}

impl MapSurface for RecordingSurface {
    fn set_source_data(&mut self, data: FeatureCollection) {
        self.pins.clone_from(&data.features);
        self.commands.push(MapCommand::SetPins { data });
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.zoom = zoom;
        self.commands.push(MapCommand::FlyTo {
            center,
            zoom,
            essential: true,
        });
    }

    fn fit_bounds(&mut self, bounds: Bounds, options: FitOptions) {
        self.zoom = estimate_fit_zoom(bounds, options.max_zoom);
        self.commands.push(MapCommand::FitBounds {
            bounds: [bounds.min, bounds.max],
            padding: options.padding,
            max_zoom: options.max_zoom,
        });
    }

    fn add_popup(&mut self, at: LngLat, html: String, options: PopupOptions) -> PopupHandle {
        let id = PopupHandle(self.next_popup);
        self.next_popup += 1;
        self.open_popups.push(id);
        self.commands.push(MapCommand::OpenPopup {
            id,
            at,
            html,
            close_button: options.close_button,
            close_on_click: options.close_on_click,
            offset: options.offset,
        });
        id
    }

    fn remove_popup(&mut self, handle: PopupHandle) {
        self.open_popups.retain(|h| *h != handle);
        self.commands.push(MapCommand::ClosePopup { id: handle });
    }
}

#[cfg(test)]
mod tests {
    use retailmap_core::RetailerProperties;

    use super::*;

    fn feature(name: &str, lng: f64, lat: f64) -> RetailerFeature {
        RetailerFeature::new(
            LngLat::new(lng, lat),
            RetailerProperties {
                retailer: Some(name.to_string()),
                ..RetailerProperties::default()
            },
        )
    }

    fn adapter(zoom: f64) -> MapAdapter<RecordingSurface> {
        MapAdapter::new(RecordingSurface::new(zoom), CameraSettings::default())
    }

    #[test]
    fn set_pins_replaces_wholesale() {
        let mut map = adapter(5.0);
        map.set_pins(&[feature("a", 0.0, 0.0), feature("b", 1.0, 1.0)]);
        map.set_pins(&[feature("c", 2.0, 2.0)]);
        assert_eq!(map.surface().pins().len(), 1);
        assert_eq!(map.surface().pins()[0].display_name(), "c");
    }

    #[test]
    fn fly_to_keeps_current_zoom_when_already_closer() {
        let mut map = adapter(14.0);
        map.fly_to(LngLat::new(-119.0, 36.0), 11.0);
        assert_eq!(
            map.surface().commands().last(),
            Some(&MapCommand::FlyTo {
                center: LngLat::new(-119.0, 36.0),
                zoom: 14.0,
                essential: true,
            })
        );
    }

    #[test]
    fn fly_to_raises_zoom_to_minimum() {
        let mut map = adapter(5.4);
        map.fly_to(LngLat::new(-119.0, 36.0), 11.0);
        assert!((map.surface().zoom() - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_zoom_feeds_the_focus_floor() {
        let mut map = adapter(5.4);
        map.fit_to_features(&[feature("a", -119.0, 36.0)]);
        map.surface_mut().set_zoom(15.0);
        map.surface_mut().take_commands();

        map.fly_to(LngLat::new(-119.0, 36.0), 11.0);
        assert!(matches!(
            map.surface().commands(),
            [MapCommand::FlyTo { zoom, .. }] if (*zoom - 15.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn fit_to_features_ignores_empty_set() {
        let mut map = adapter(5.4);
        map.fit_to_features(&[]);
        assert!(map.surface().commands().is_empty());
    }

    #[test]
    fn fit_to_features_uses_padding_and_zoom_cap() {
        let mut map = adapter(5.4);
        map.fit_to_features(&[feature("a", -119.0, 36.0), feature("b", -122.0, 38.0)]);
        assert_eq!(
            map.surface().commands(),
            [MapCommand::FitBounds {
                bounds: [LngLat::new(-122.0, 36.0), LngLat::new(-119.0, 38.0)],
                padding: 60,
                max_zoom: 10.0,
            }]
        );
    }

    #[test]
    fn fit_to_single_point_is_capped() {
        let mut map = adapter(5.4);
        map.fit_to_features(&[feature("a", -119.0, 36.0)]);
        assert!((map.surface().zoom() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn opening_a_popup_closes_the_previous_one() {
        let mut map = adapter(5.4);
        map.open_popup(&feature("a", 0.0, 0.0));
        let first = map.active_popup().expect("popup open");
        map.open_popup(&feature("b", 1.0, 1.0));
        let second = map.active_popup().expect("popup open");

        assert_ne!(first, second);
        assert_eq!(map.surface().open_popups(), [second]);
        assert!(map
            .surface()
            .commands()
            .contains(&MapCommand::ClosePopup { id: first }));
    }

    #[test]
    fn close_popup_without_popup_is_noop() {
        let mut map = adapter(5.4);
        map.close_popup();
        assert!(map.surface().commands().is_empty());
    }

    #[test]
    fn focus_flies_then_opens_popup() {
        let mut map = adapter(5.4);
        map.focus(&feature("a", -119.0, 36.0));
        let commands = map.surface_mut().take_commands();
        assert!(matches!(commands[0], MapCommand::FlyTo { zoom, .. } if (zoom - 11.0).abs() < f64::EPSILON));
        assert!(matches!(commands[1], MapCommand::OpenPopup { ref html, .. } if html.contains("retail-popup")));
        assert!(map.surface().commands().is_empty());
    }

    #[test]
    fn map_command_serializes_with_op_tag() {
        let json = serde_json::to_value(MapCommand::FlyTo {
            center: LngLat::new(-119.0, 36.0),
            zoom: 10.0,
            essential: true,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "op": "fly_to", "center": [-119.0, 36.0], "zoom": 10.0, "essential": true })
        );
    }
}

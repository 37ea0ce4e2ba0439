//! Map view state
//!
//! Tracks the map widget lifecycle and turns widget events into coordinates
//! to reconcile. The map never holds address text, only the coordinate it
//! shows.

use crate::address::{Address, Coordinates};
use crate::config::Config;
use serde::{Deserialize, Serialize};

/// A latitude/longitude box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    /// Degenerate bounds on a single point
    pub fn around(point: Coordinates) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }
}

/// Map lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MapState {
    /// Provider library not ready; a skeleton is shown
    NotLoaded,
    /// Map mounted; `bounds` is what the viewport was fitted to and `zoom`
    /// the last level the widget reported (fractional on vector maps)
    Loaded {
        bounds: Option<Bounds>,
        #[serde(default)]
        zoom: Option<f64>,
    },
    Unmounted,
}

/// An event reported by the map widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapEvent {
    DragEnd {
        #[serde(default)]
        center: Option<Coordinates>,
    },
    Click {
        #[serde(default)]
        lat_lng: Option<Coordinates>,
    },
    ZoomChanged {
        #[serde(default)]
        center: Option<Coordinates>,
        #[serde(default)]
        zoom: Option<f64>,
    },
}

/// What sits on top of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    /// Pin at the map center
    CenterMarker,
    /// "Locate Me" button
    LocateMe,
}

/// Overlay for the current address
pub fn overlay(address: &Address) -> Overlay {
    if address.has_coords() {
        Overlay::CenterMarker
    } else {
        Overlay::LocateMe
    }
}

/// Widget options handed to the browser, in the widget's own key casing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub zoom: u8,
    pub map_id: String,
    pub zoom_control: bool,
    pub street_view_control: bool,
    pub map_type_control: bool,
    pub fullscreen_control: bool,
    pub disable_default_ui: bool,
}

impl MapOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            zoom: config.map.zoom,
            map_id: config.provider.map_id.clone(),
            zoom_control: false,
            street_view_control: false,
            map_type_control: false,
            fullscreen_control: false,
            disable_default_ui: true,
        }
    }
}

/// One page's map
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    state: MapState,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView {
    pub fn new() -> Self {
        Self {
            state: MapState::NotLoaded,
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, MapState::Loaded { .. })
    }

    /// Mount the map, fitting the viewport around the current coordinate
    pub fn load(&mut self, center: Option<Coordinates>) -> Option<Bounds> {
        let bounds = center.map(Bounds::around);
        self.state = MapState::Loaded { bounds, zoom: None };
        bounds
    }

    pub fn unload(&mut self) {
        self.state = MapState::Unmounted;
    }

    /// Coordinate to reconcile for an event
    ///
    /// Events are ignored unless the map is loaded.
    pub fn target(&mut self, event: &MapEvent) -> Option<Coordinates> {
        if !self.is_loaded() {
            return None;
        }

        let coords = match *event {
            MapEvent::DragEnd { center } => center,
            MapEvent::Click { lat_lng } => lat_lng,
            MapEvent::ZoomChanged { center, zoom } => {
                if let (MapState::Loaded { zoom: current, .. }, Some(level)) =
                    (&mut self.state, zoom)
                {
                    if level.is_finite() {
                        *current = Some(level);
                    }
                }
                center
            }
        }?;

        coords.validate().ok().map(|_| coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_not_loaded() {
        let mut map = MapView::new();
        assert_eq!(map.state(), MapState::NotLoaded);

        let event = MapEvent::Click {
            lat_lng: Some(Coordinates::new(1.0, 1.0)),
        };
        assert!(map.target(&event).is_none());
    }

    #[test]
    fn test_load_fits_bounds() {
        let mut map = MapView::new();
        let center = Coordinates::new(27.7, 85.3);

        let bounds = map.load(Some(center)).unwrap();

        assert!(map.is_loaded());
        assert_eq!(bounds.south_west, center);
        assert_eq!(bounds.north_east, center);
    }

    #[test]
    fn test_load_without_coordinate() {
        let mut map = MapView::new();
        assert!(map.load(None).is_none());
        assert_eq!(
            map.state(),
            MapState::Loaded {
                bounds: None,
                zoom: None
            }
        );
    }

    #[test]
    fn test_events_yield_targets() {
        let mut map = MapView::new();
        map.load(None);

        let drag = MapEvent::DragEnd {
            center: Some(Coordinates::new(12.0, 77.0)),
        };
        assert_eq!(map.target(&drag), Some(Coordinates::new(12.0, 77.0)));

        let click = MapEvent::Click { lat_lng: None };
        assert!(map.target(&click).is_none());

        let zoom = MapEvent::ZoomChanged {
            center: Some(Coordinates::new(13.0, 78.0)),
            zoom: Some(15.0),
        };
        assert_eq!(map.target(&zoom), Some(Coordinates::new(13.0, 78.0)));
        assert!(matches!(map.state(), MapState::Loaded { zoom: Some(z), .. } if z == 15.0));
    }

    #[test]
    fn test_unmounted_ignores_events() {
        let mut map = MapView::new();
        map.load(None);
        map.unload();

        let drag = MapEvent::DragEnd {
            center: Some(Coordinates::new(12.0, 77.0)),
        };
        assert!(map.target(&drag).is_none());
        assert_eq!(map.state(), MapState::Unmounted);
    }

    #[test]
    fn test_fractional_zoom_event() {
        let event: MapEvent = serde_json::from_str(
            r#"{"type":"zoom_changed","center":{"lat":28.6,"lng":77.2},"zoom":12.5}"#,
        )
        .unwrap();

        let mut map = MapView::new();
        map.load(None);
        assert_eq!(map.target(&event), Some(Coordinates::new(28.6, 77.2)));

        match map.state() {
            MapState::Loaded { zoom: Some(zoom), .. } => assert_relative_eq!(zoom, 12.5),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_overlay() {
        assert_eq!(overlay(&Address::default()), Overlay::LocateMe);
        assert_eq!(
            overlay(&Address::at(Coordinates::new(0.0, 0.0))),
            Overlay::CenterMarker
        );
    }

    #[test]
    fn test_event_json() {
        let event: MapEvent =
            serde_json::from_str(r#"{"type":"drag_end","center":{"lat":1.5,"lng":2.5}}"#).unwrap();
        assert_eq!(
            event,
            MapEvent::DragEnd {
                center: Some(Coordinates::new(1.5, 2.5))
            }
        );

        let event: MapEvent = serde_json::from_str(r#"{"type":"click"}"#).unwrap();
        assert_eq!(event, MapEvent::Click { lat_lng: None });
    }

    #[test]
    fn test_options_from_config() {
        let options = MapOptions::from_config(&Config::default());
        assert_eq!(options.zoom, 10);
        assert!(options.disable_default_ui);
        assert!(!options.zoom_control);
    }
}

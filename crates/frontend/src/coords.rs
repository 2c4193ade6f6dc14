use pinmap_shared::geo::{self, LatLng};
use serde::{Deserialize, Serialize};

/// Default view: Tokyo Station at a country-wide zoom.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 35.6812,
    lng: 139.7671,
};
pub const DEFAULT_ZOOM: u8 = 5;

/// The visible map state: a center coordinate plus an integer tile zoom.
///
/// All screen math is expressed as offsets from the container center, so it
/// stays valid whatever size the container is laid out at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    /// Clamp fields back into servable ranges (for values loaded from storage).
    pub fn sanitized(self) -> Self {
        Self {
            center: LatLng::new(self.center.lat, self.center.lng),
            zoom: geo::clamp_zoom(self.zoom as i32),
        }
    }

    /// Screen offset of `pos` from the container center, in pixels.
    pub fn offset_of(&self, pos: LatLng) -> (f64, f64) {
        let (cx, cy) = geo::project(self.center, self.zoom);
        let (px, py) = geo::project(pos, self.zoom);
        (px - cx, py - cy)
    }

    /// Coordinate at a pixel offset from the container center.
    pub fn coord_at(&self, dx: f64, dy: f64) -> LatLng {
        let (cx, cy) = geo::project(self.center, self.zoom);
        geo::unproject(cx + dx, cy + dy, self.zoom)
    }

    /// Change zoom while keeping the coordinate at `(ax, ay)` (a pixel offset
    /// from the container center) fixed on screen.
    pub fn zoomed_about(&self, new_zoom: u8, ax: f64, ay: f64) -> Self {
        let anchor = self.coord_at(ax, ay);
        let (px, py) = geo::project(anchor, new_zoom);
        let center = geo::unproject(px - ax, py - ay, new_zoom);
        Self {
            center,
            zoom: new_zoom,
        }
    }
}

/// Pure form of the click conversion: container-relative click to coordinate.
pub fn container_click_to_coord(
    vp: Viewport,
    container_x: f64,
    container_y: f64,
    container_w: f64,
    container_h: f64,
) -> LatLng {
    vp.coord_at(
        container_x - container_w / 2.0,
        container_y - container_h / 2.0,
    )
}

/// Get container-relative click coordinates using web_sys, then convert to a
/// map coordinate at the current viewport.
pub fn click_to_lat_lng(
    client_x: f64,
    client_y: f64,
    container_id: &str,
    vp: Viewport,
) -> Option<LatLng> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();
    if rect.width() <= 0.0 {
        return None;
    }

    Some(container_click_to_coord(
        vp,
        client_x - rect.left(),
        client_y - rect.top(),
        rect.width(),
        rect.height(),
    ))
}

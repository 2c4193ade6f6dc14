use serde::{Deserialize, Serialize};

/// Web Mercator world model.
///
/// The world at zoom `z` is a square of `256 * 2^z` pixels with (0, 0) at
/// the north-west corner. Latitude is clamped to ±85.05112878° where the
/// projection diverges; longitude wraps into [-180, 180).
// Tile edge length in pixels
pub const TILE_SIZE: f64 = 256.0;

// Latitude cutoff of the projection
pub const MAX_LATITUDE: f64 = 85.05112878;

// Zoom levels served by the tile host
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 19;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Build a coordinate with latitude clamped to the projectable range
    /// and longitude wrapped into [-180, 180).
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            lng: wrap_lng(lng),
        }
    }
}

/// Wrap a longitude into [-180, 180). A value already in range comes back
/// bit-exact, not rerounded through the modular arithmetic.
pub fn wrap_lng(lng: f64) -> f64 {
    if lng >= -180.0 && lng < 180.0 {
        return lng;
    }
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Clamp a zoom level to the servable range.
pub fn clamp_zoom(zoom: i32) -> u8 {
    zoom.clamp(MIN_ZOOM as i32, MAX_ZOOM as i32) as u8
}

/// Side length of the world square at `zoom`, in pixels.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Project a coordinate into world pixel space at `zoom`.
pub fn project(pos: LatLng, zoom: u8) -> (f64, f64) {
    let world = world_size(zoom);
    let sin = pos
        .lat
        .clamp(-MAX_LATITUDE, MAX_LATITUDE)
        .to_radians()
        .sin();

    let x = (pos.lng + 180.0) / 360.0 * world;
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * std::f64::consts::PI)) * world;
    (x, y)
}

/// Inverse of [`project`]: world pixels back to a coordinate.
pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let world = world_size(zoom);
    let lng = x / world * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / world);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Format a coordinate for readouts, e.g. "35.6812° N, 139.7671° E".
pub fn format_lat_lng(pos: LatLng) -> String {
    let ns = if pos.lat < 0.0 { 'S' } else { 'N' };
    let ew = if pos.lng < 0.0 { 'W' } else { 'E' };
    format!("{:.4}° {}, {:.4}° {}", pos.lat.abs(), ns, pos.lng.abs(), ew)
}

use dioxus::logger::tracing::{debug, warn};

use crate::coords::Viewport;

/// localStorage key for the persisted viewport.
const VIEWPORT_KEY: &str = "pinmap.viewport";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Load the persisted viewport, falling back to the default view when
/// storage is unavailable or holds something unusable.
pub fn load_viewport() -> Viewport {
    let stored = local_storage().and_then(|s| s.get_item(VIEWPORT_KEY).ok().flatten());
    let Some(raw) = stored else {
        return Viewport::default();
    };
    decode_viewport(&raw).unwrap_or_else(|| {
        warn!("discarding unreadable stored viewport");
        Viewport::default()
    })
}

/// Persist the viewport. Best-effort: private browsing may refuse writes.
pub fn store_viewport(vp: Viewport) {
    let Some(storage) = local_storage() else {
        return;
    };
    if let Ok(raw) = serde_json::to_string(&vp) {
        let _ = storage.set_item(VIEWPORT_KEY, &raw);
        debug!("stored viewport {raw}");
    }
}

/// Decode a persisted viewport string, clamping out-of-range values.
fn decode_viewport(raw: &str) -> Option<Viewport> {
    serde_json::from_str::<Viewport>(raw)
        .ok()
        .map(Viewport::sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{DEFAULT_CENTER, DEFAULT_ZOOM};
    use pinmap_shared::geo;

    #[test]
    fn test_decode_valid_viewport() {
        let raw = r#"{"center":{"lat":35.6812,"lng":139.7671},"zoom":12}"#;
        let vp = decode_viewport(raw).unwrap();
        assert_eq!(vp.zoom, 12);
        assert!((vp.center.lat - 35.6812).abs() < 1e-9);
    }

    #[test]
    fn test_decode_garbage_is_none() {
        assert!(decode_viewport("not json").is_none());
        assert!(decode_viewport(r#"{"zoom":12}"#).is_none());
        assert!(decode_viewport("").is_none());
    }

    #[test]
    fn test_decode_clamps_out_of_range() {
        let raw = r#"{"center":{"lat":89.0,"lng":200.0},"zoom":99}"#;
        let vp = decode_viewport(raw).unwrap();
        assert!((vp.center.lat - geo::MAX_LATITUDE).abs() < 1e-9);
        assert!((vp.center.lng - -160.0).abs() < 1e-9);
        assert_eq!(vp.zoom, geo::MAX_ZOOM);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let vp = Viewport {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        };
        let raw = serde_json::to_string(&vp).unwrap();
        let back = decode_viewport(&raw).unwrap();
        assert_eq!(back, vp);
    }
}

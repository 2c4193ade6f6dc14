use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// A labeled point of interest as stored by the pin service.
///
/// `id` is assigned server-side; pins built client-side carry an empty id
/// until the create call echoes the stored record back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub image_url: String,
}

impl Pin {
    /// Build a not-yet-stored pin at `position`.
    pub fn unsaved(
        title: String,
        description: String,
        category: String,
        image_url: String,
        position: LatLng,
    ) -> Self {
        Self {
            id: String::new(),
            title,
            description,
            latitude: position.lat,
            longitude: position.lng,
            category,
            image_url,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_serializes_camel_case() {
        let pin = Pin::unsaved(
            "Cafe".to_string(),
            "Good coffee".to_string(),
            "food".to_string(),
            "https://example.com/cafe.jpg".to_string(),
            LatLng::new(35.0, 139.0),
        );
        let value = serde_json::to_value(&pin).unwrap();
        assert_eq!(value["imageUrl"], "https://example.com/cafe.jpg");
        assert_eq!(value["latitude"], 35.0);
        assert_eq!(value["longitude"], 139.0);
        assert!(value.get("image_url").is_none());
    }

    #[test]
    fn test_pin_deserializes_without_id() {
        let json = r#"{
            "title": "Shrine",
            "description": "",
            "latitude": 34.9671,
            "longitude": 135.7727,
            "category": "sight",
            "imageUrl": ""
        }"#;
        let pin: Pin = serde_json::from_str(json).unwrap();
        assert_eq!(pin.id, "");
        assert_eq!(pin.title, "Shrine");
    }

    #[test]
    fn test_unsaved_has_empty_id_and_clicked_position() {
        let pin = Pin::unsaved(
            "Cafe".to_string(),
            String::new(),
            String::new(),
            String::new(),
            LatLng::new(35.0, 139.0),
        );
        assert_eq!(pin.id, "");
        assert!((pin.latitude - 35.0).abs() < 1e-9);
        assert!((pin.longitude - 139.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_roundtrip() {
        let pin: Pin = serde_json::from_str(
            r#"{"id":"p1","title":"t","description":"","latitude":-33.4489,
                "longitude":-70.6693,"category":"","imageUrl":""}"#,
        )
        .unwrap();
        let pos = pin.position();
        assert!((pos.lat - -33.4489).abs() < 1e-9);
        assert!((pos.lng - -70.6693).abs() < 1e-9);
    }
}

use pinmap_shared::models::Pin;

/// Build the pin-collection endpoint from a service origin.
pub fn pins_endpoint(origin: &str) -> String {
    format!("{}/api/pins", origin)
}

fn api_url() -> String {
    // In production, same origin. In dev, might be different.
    let window = web_sys::window().unwrap();
    let origin = window.location().origin().unwrap();
    pins_endpoint(&origin)
}

/// Fetch every stored pin.
pub async fn fetch_pins() -> Result<Vec<Pin>, String> {
    let resp = reqwest::Client::new()
        .get(api_url())
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    resp.json::<Vec<Pin>>().await.map_err(|e| e.to_string())
}

/// Create a pin and return the stored record with its assigned id.
pub async fn add_pin(pin: &Pin) -> Result<Pin, String> {
    let resp = reqwest::Client::new()
        .post(api_url())
        .json(pin)
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    resp.json::<Pin>().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- URL builder ---

    #[test]
    fn test_pins_endpoint_local() {
        assert_eq!(
            pins_endpoint("http://localhost:8080"),
            "http://localhost:8080/api/pins"
        );
    }

    #[test]
    fn test_pins_endpoint_production() {
        assert_eq!(
            pins_endpoint("https://pins.example.com"),
            "https://pins.example.com/api/pins"
        );
    }

    // --- Response deserialization ---

    #[test]
    fn test_pin_list_deserializes() {
        let json = r#"[
            {"id":"p1","title":"Cafe","description":"Good coffee","latitude":35.0,
             "longitude":139.0,"category":"food","imageUrl":"https://example.com/c.jpg"},
            {"id":"p2","title":"Shrine","description":"","latitude":34.9671,
             "longitude":135.7727,"category":"sight","imageUrl":""}
        ]"#;
        let pins: Vec<Pin> = serde_json::from_str(json).unwrap();
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[0].id, "p1");
        assert_eq!(pins[0].title, "Cafe");
        assert!((pins[1].latitude - 34.9671).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pin_list_deserializes() {
        let pins: Vec<Pin> = serde_json::from_str("[]").unwrap();
        assert!(pins.is_empty());
    }

    #[test]
    fn test_created_pin_echo_deserializes() {
        // The create call echoes the stored record, now carrying an id
        let json = r#"{"id":"4f2a","title":"Cafe","description":"","latitude":35.0,
                       "longitude":139.0,"category":"","imageUrl":""}"#;
        let pin: Pin = serde_json::from_str(json).unwrap();
        assert_eq!(pin.id, "4f2a");
    }
}

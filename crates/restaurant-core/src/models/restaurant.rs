//! Restaurant model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Geographic position of a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A restaurant as served by the remote API.
///
/// Restaurants are created server-side and only ever cached locally; nothing
/// in this crate mutates one after it has been fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Server-assigned identifier
    #[serde(deserialize_with = "super::lenient_i64")]
    pub id: i64,
    pub name: String,
    pub neighborhood: String,
    pub cuisine_type: String,
    #[serde(default)]
    pub address: String,
    pub latlng: LatLng,
    /// Photograph name under `/img`, without extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photograph: Option<String>,
    /// Opening hours keyed by day name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub operating_hours: BTreeMap<String, String>,
}

impl Restaurant {
    /// Relative URL of the restaurant detail page.
    pub fn detail_url(&self) -> String {
        format!("./restaurant.html?id={}", self.id)
    }

    /// Relative URL of the restaurant photograph, if it has one.
    pub fn image_url(&self) -> Option<String> {
        self.photograph
            .as_deref()
            .map(str::trim)
            .filter(|photo| !photo.is_empty())
            .map(|photo| format!("/img/{photo}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 5,
            "name": "Hometown BBQ",
            "neighborhood": "Brooklyn",
            "photograph": "5",
            "address": "454 Van Brunt St, Brooklyn, NY 11231",
            "latlng": { "lat": 40.674925, "lng": -74.016162 },
            "cuisine_type": "American",
            "operating_hours": { "Monday": "Closed", "Tuesday": "12:00 pm - 10:00 pm" },
            "createdAt": 1504095567183,
            "is_favorite": "false"
        }"#
    }

    #[test]
    fn test_parse_api_payload() {
        let restaurant: Restaurant = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(restaurant.id, 5);
        assert_eq!(restaurant.cuisine_type, "American");
        assert_eq!(restaurant.operating_hours.len(), 2);
        assert!((restaurant.latlng.lat - 40.674_925).abs() < f64::EPSILON);
    }

    #[test]
    fn test_detail_url() {
        let restaurant: Restaurant = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(restaurant.detail_url(), "./restaurant.html?id=5");
    }

    #[test]
    fn test_image_url() {
        let mut restaurant: Restaurant = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(restaurant.image_url().as_deref(), Some("/img/5"));

        restaurant.photograph = None;
        assert_eq!(restaurant.image_url(), None);

        restaurant.photograph = Some("  ".to_string());
        assert_eq!(restaurant.image_url(), None);
    }

    #[test]
    fn test_string_id_is_accepted() {
        let json = sample_json().replace("\"id\": 5", "\"id\": \"5\"");
        let restaurant: Restaurant = serde_json::from_str(&json).unwrap();
        assert_eq!(restaurant.id, 5);
    }
}

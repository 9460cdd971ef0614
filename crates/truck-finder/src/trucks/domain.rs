use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Permit record as returned by the open-data endpoint.
///
/// Socrata serializes every column as a string, coordinates included, so the
/// known fields stay textual. Columns outside the known set are preserved in
/// `extra` and written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodTruck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locationdescription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fooditems: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<TruckLocation>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FoodTruck {
    /// Latitude/longitude pair, preferring the textual columns over the geometry.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let parsed: Option<(f64, f64)> = self
            .latitude
            .as_deref()
            .zip(self.longitude.as_deref())
            .and_then(|(lat, lng)| Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?)));

        parsed.or_else(|| match &self.location {
            Some(TruckLocation::Point(point)) => Some((point.coordinates[1], point.coordinates[0])),
            _ => None,
        })
    }
}

/// Geometry column. Socrata emits GeoJSON points for `location`, older exports
/// carry a formatted string, and anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TruckLocation {
    Point(GeoPoint),
    Text(String),
    Other(Value),
}

/// GeoJSON point; `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_columns_are_preserved() {
        let payload = json!({
            "objectid": "1571753",
            "applicant": "The Geez Freeze",
            "status": "APPROVED",
            "latitude": "37.78",
            "longitude": "-122.41",
            "location": { "type": "Point", "coordinates": [-122.41, 37.78] },
            "permit": "21MFF-00106",
            ":@computed_region_yftq_j783": "4"
        });

        let truck: FoodTruck = serde_json::from_value(payload.clone()).expect("record parses");
        assert_eq!(truck.applicant.as_deref(), Some("The Geez Freeze"));
        assert_eq!(truck.extra.get("permit"), Some(&json!("21MFF-00106")));
        assert!(matches!(truck.location, Some(TruckLocation::Point(_))));
        assert_eq!(serde_json::to_value(&truck).expect("serializes"), payload);
    }

    #[test]
    fn coordinates_fall_back_to_geometry() {
        let truck = FoodTruck {
            location: Some(TruckLocation::Point(GeoPoint {
                kind: "Point".to_string(),
                coordinates: [-122.41, 37.78],
            })),
            ..FoodTruck::default()
        };
        assert_eq!(truck.coordinates(), Some((37.78, -122.41)));

        let text_only = FoodTruck {
            location: Some(TruckLocation::Text("(37.78, -122.41)".to_string())),
            ..FoodTruck::default()
        };
        assert_eq!(text_only.coordinates(), None);
    }

    #[test]
    fn sparse_records_parse() {
        let truck: FoodTruck = serde_json::from_value(json!({})).expect("empty record parses");
        assert_eq!(truck, FoodTruck::default());
    }
}

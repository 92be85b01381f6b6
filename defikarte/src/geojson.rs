//! GeoJSON export of defibrillator locations.
//!
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use defikarte::geojson::to_feature_collection;
//!
//! let elements = service.all_defibrillators().await?;
//! let collection = to_feature_collection(&elements);
//! println!("{}", collection);
//! ```

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};

use crate::overpass::OverpassElement;

/// Convert one element to a Point feature.
///
/// The OSM id becomes the feature id and the tags become its properties.
/// Returns `None` for elements without coordinates (ways, relations).
pub fn to_feature(element: &OverpassElement) -> Option<Feature> {
    let (lat, lon) = (element.lat?, element.lon?);

    let properties: JsonObject = element
        .tags
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();

    Some(Feature {
        bbox: None,
        // GeoJSON positions are [longitude, latitude]
        geometry: Some(Geometry::new(GeoJsonValue::Point(vec![lon, lat]))),
        id: Some(Id::Number(element.id.into())),
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Convert a result set to a feature collection, skipping elements without
/// coordinates.
pub fn to_feature_collection(elements: &[OverpassElement]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: elements.iter().filter_map(to_feature).collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(json: &str) -> OverpassElement {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_node_to_feature() {
        let node = element(
            r#"{"type": "node", "id": 42, "lat": 47.5, "lon": 8.7, "tags": {"emergency": "defibrillator", "indoor": "yes"}}"#,
        );
        let feature = to_feature(&node).unwrap();

        let geometry = feature.geometry.unwrap();
        assert_eq!(geometry.value, GeoJsonValue::Point(vec![8.7, 47.5]));
        assert_eq!(feature.id, Some(Id::Number(42.into())));

        let properties = feature.properties.unwrap();
        assert_eq!(properties["emergency"], "defibrillator");
        assert_eq!(properties["indoor"], "yes");
    }

    #[test]
    fn test_element_without_coordinates_is_skipped() {
        let way = element(r#"{"type": "way", "id": 7, "nodes": [1, 2, 3]}"#);
        assert!(to_feature(&way).is_none());

        let node = element(r#"{"type": "node", "id": 1, "lat": 1.0, "lon": 2.0}"#);
        let collection = to_feature_collection(&[way, node]);
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn test_collection_serializes_as_geojson() {
        let node = element(r#"{"type": "node", "id": 1, "lat": 46.0, "lon": 7.0}"#);
        let collection = to_feature_collection(&[node]);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0], 7.0);
    }
}

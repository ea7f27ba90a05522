use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use log::warn;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::annotator::{ArrowMarker, DayLabel, OverlaySet, RouteSegment};
use crate::geo_math::Coordinate;
use crate::map_view::{AttractionMarker, MapView};

/// Render the view's current state as a GeoJSON FeatureCollection.
///
/// Segments come first, then arrows, labels and attraction pins, so a
/// surface that draws in order stacks markers above lines.
pub fn to_feature_collection(view: &MapView) -> FeatureCollection {
    let overlays = view.overlays();
    let mut features = overlay_features(overlays);
    features.extend(view.visible_attractions().iter().map(attraction_to_feature));

    let mut members = Map::new();
    members.insert(
        "generation".to_string(),
        JsonValue::Number(overlays.generation.into()),
    );
    members.insert(
        "selectedDay".to_string(),
        match view.selected_day() {
            Some(day) => JsonValue::Number(day.into()),
            None => JsonValue::Null,
        },
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(members),
    }
}

/// Features for every segment, arrow and label in the set.
pub fn overlay_features(set: &OverlaySet) -> Vec<Feature> {
    let mut features = Vec::with_capacity(set.len());
    features.extend(set.segments.iter().map(segment_to_feature));
    features.extend(set.arrows.iter().map(arrow_to_feature));
    features.extend(set.labels.iter().map(label_to_feature));
    features
}

fn segment_to_feature(seg: &RouteSegment) -> Feature {
    let coords = seg.path.iter().map(|c| position(*c)).collect();
    let geometry = Geometry::new(Value::LineString(coords));

    let mut props = kind_props("segment", &seg.color);
    props.insert("from".to_string(), JsonValue::String(seg.from.clone()));
    props.insert("to".to_string(), JsonValue::String(seg.to.clone()));
    props.insert("fromDay".to_string(), JsonValue::Number(seg.from_day.into()));
    props.insert("day".to_string(), JsonValue::Number(seg.day.into()));
    props.insert(
        "distanceKm".to_string(),
        JsonValue::Number(seg.distance_km.into()),
    );
    insert_f64(&mut props, "bearingDeg", seg.bearing_deg);
    props.insert("dashed".to_string(), JsonValue::Bool(seg.dashed));

    feature(seg.id.as_str(), geometry, props)
}

fn arrow_to_feature(arrow: &ArrowMarker) -> Feature {
    let geometry = Geometry::new(Value::Point(position(arrow.position)));

    let mut props = kind_props("arrow", &arrow.color);
    props.insert(
        "segment".to_string(),
        JsonValue::String(arrow.segment.to_string()),
    );
    insert_f64(&mut props, "rotation", arrow.rotation_deg);

    feature(arrow.id.as_str(), geometry, props)
}

fn label_to_feature(label: &DayLabel) -> Feature {
    let geometry = Geometry::new(Value::Point(position(label.position)));

    let mut props = kind_props("label", &label.color);
    props.insert(
        "segment".to_string(),
        JsonValue::String(label.segment.to_string()),
    );
    props.insert("day".to_string(), JsonValue::Number(label.day.into()));
    props.insert(
        "distanceKm".to_string(),
        JsonValue::Number(label.distance_km.into()),
    );
    if let Some(detail) = &label.detail {
        insert_detail(&mut props, label.id.as_str(), detail);
    }

    feature(label.id.as_str(), geometry, props)
}

fn attraction_to_feature(marker: &AttractionMarker) -> Feature {
    let geometry = Geometry::new(Value::Point(position(marker.position)));

    let mut props = kind_props("attraction", &marker.color);
    props.insert("name".to_string(), JsonValue::String(marker.name.clone()));
    if let Some(ref en) = marker.name_en {
        props.insert("nameEn".to_string(), JsonValue::String(en.clone()));
    }
    props.insert("day".to_string(), JsonValue::Number(marker.day.into()));
    props.insert(
        "category".to_string(),
        JsonValue::String(marker.category.as_str().to_string()),
    );
    props.insert(
        "symbol".to_string(),
        JsonValue::String(marker.symbol.to_string()),
    );
    props.insert(
        "offset".to_string(),
        JsonValue::Array(
            marker
                .offset
                .iter()
                .map(|&px| JsonValue::Number(px.into()))
                .collect(),
        ),
    );

    let id = format!("attraction:{}", marker.id);
    insert_detail(&mut props, &id, &marker.detail);

    feature(&id, geometry, props)
}

/// GeoJSON position: [lon, lat].
fn position(c: Coordinate) -> Vec<f64> {
    vec![c.lon, c.lat]
}

fn kind_props(kind: &str, color: &str) -> Map<String, JsonValue> {
    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String(kind.to_string()));
    props.insert("color".to_string(), JsonValue::String(color.to_string()));
    props
}

/// Non-finite values have no JSON form and are written as `null`.
fn insert_f64(props: &mut Map<String, JsonValue>, key: &str, value: f64) {
    let json = match serde_json::Number::from_f64(value) {
        Some(n) => JsonValue::Number(n),
        None => {
            warn!("non-finite {key} ({value}) written as null");
            JsonValue::Null
        }
    };
    props.insert(key.to_string(), json);
}

fn insert_detail<T: Serialize>(props: &mut Map<String, JsonValue>, id: &str, detail: &T) {
    match serde_json::to_value(detail) {
        Ok(value) => {
            props.insert("detail".to_string(), value);
        }
        Err(e) => warn!("dropping popup detail for {id}: {e}"),
    }
}

fn feature(id: &str, geometry: Geometry, props: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: Some(Id::String(id.to_string())),
        properties: Some(props),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::options::MapOptions;

    fn view() -> MapView {
        MapView::new(Dataset::builtin().unwrap(), MapOptions::default()).unwrap()
    }

    fn kinds(fc: &FeatureCollection) -> Vec<&str> {
        fc.features
            .iter()
            .map(|f| f.properties.as_ref().unwrap()["kind"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_full_route_features() {
        let fc = to_feature_collection(&view());
        // 7 segments, 14 arrows, 7 labels, 8 attractions
        assert_eq!(fc.features.len(), 36);

        let k = kinds(&fc);
        assert!(k[..7].iter().all(|&k| k == "segment"));
        assert!(k[7..21].iter().all(|&k| k == "arrow"));
        assert!(k[21..28].iter().all(|&k| k == "label"));
        assert!(k[28..].iter().all(|&k| k == "attraction"));

        let members = fc.foreign_members.as_ref().unwrap();
        assert_eq!(members["generation"], 1);
        assert!(members["selectedDay"].is_null());
    }

    #[test]
    fn test_segment_feature() {
        let fc = to_feature_collection(&view());
        let f = &fc.features[0];
        assert_eq!(f.id, Some(Id::String("segment:urumqi->tianchi".to_string())));

        let geom = f.geometry.as_ref().unwrap();
        if let Value::LineString(coords) = &geom.value {
            // Check [lon, lat] order
            assert!((coords[0][0] - 87.6168).abs() < 1e-10);
            assert!((coords[0][1] - 43.8256).abs() < 1e-10);
            assert!((coords[1][0] - 88.1333).abs() < 1e-10);
        } else {
            panic!("Expected LineString geometry");
        }

        let props = f.properties.as_ref().unwrap();
        assert_eq!(props["day"], 2);
        assert_eq!(props["fromDay"], 1);
        assert_eq!(props["distanceKm"], 42);
        assert_eq!(props["color"], "#38bdf8");
        assert_eq!(props["dashed"], true);
    }

    #[test]
    fn test_label_detail() {
        let mut v = view();
        v.select_day(Some(3));
        let fc = to_feature_collection(&v);

        let labels: Vec<&Feature> = fc
            .features
            .iter()
            .filter(|f| f.properties.as_ref().unwrap()["kind"] == "label")
            .collect();
        assert_eq!(labels.len(), 2);

        let props = labels[0].properties.as_ref().unwrap();
        assert_eq!(props["day"], 3);
        let detail = props["detail"].as_object().unwrap();
        assert_eq!(detail["day"], 3);
        assert_eq!(detail["distanceKm"], 363);
        assert_eq!(detail["action"]["type"], "selectDay");
        assert_eq!(detail["action"]["day"], 3);
        assert_eq!(detail["meals"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_attraction_feature() {
        let mut v = view();
        v.select_day(Some(1));
        let fc = to_feature_collection(&v);

        let pins: Vec<&Feature> = fc
            .features
            .iter()
            .filter(|f| f.properties.as_ref().unwrap()["kind"] == "attraction")
            .collect();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].id, Some(Id::String("attraction:urumqi".to_string())));

        let props = pins[0].properties.as_ref().unwrap();
        assert_eq!(props["nameEn"], "Urumqi");
        assert_eq!(props["category"], "city");
        assert_eq!(props["offset"], serde_json::json!([0, 0]));
        assert_eq!(fc.foreign_members.as_ref().unwrap()["selectedDay"], 1);

        let detail = props["detail"].as_object().unwrap();
        assert_eq!(detail["description"], "新疆维吾尔自治区首府，丝绸之路重镇");
        assert_eq!(detail["highlights"].as_array().unwrap().len(), 3);
        assert_eq!(detail["highlights"][2], "国际大巴扎");
        assert!(detail["image"].as_str().unwrap().starts_with("https://images.pexels.com/"));
        assert_eq!(detail["duration"], "全天");
        assert_eq!(detail["action"], serde_json::json!({"type": "selectDay", "day": 1}));
    }

    #[test]
    fn test_every_pin_carries_detail() {
        let fc = to_feature_collection(&view());
        for f in fc.features.iter().skip(28) {
            let props = f.properties.as_ref().unwrap();
            assert_eq!(props["detail"]["action"]["day"], props["day"]);
        }
    }

    #[test_log::test]
    fn test_non_finite_number_becomes_null() {
        let mut props = Map::new();
        insert_f64(&mut props, "bearingDeg", f64::NAN);
        insert_f64(&mut props, "rotation", 81.5);
        assert!(props["bearingDeg"].is_null());
        assert_eq!(props["rotation"], 81.5);
    }
}

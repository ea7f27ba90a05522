#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use tripmap_wasm::TripMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn trip_map_select_and_reset() {
    let mut map = TripMap::new(None, JsValue::UNDEFINED).unwrap();
    assert_eq!(map.selected_day(), None);

    let update = map.select_day(Some(3)).unwrap();
    assert!(!update.is_null());
    assert_eq!(map.selected_day(), Some(3));

    // same day again: nothing to redraw
    assert!(map.select_day(Some(3)).unwrap().is_null());

    map.toggle_day(3).unwrap();
    assert_eq!(map.selected_day(), None);
}

#[wasm_bindgen_test]
fn trip_map_features_string() {
    let map = TripMap::new(None, JsValue::NULL).unwrap();
    let json: serde_json::Value = serde_json::from_str(&map.features_string().unwrap()).unwrap();
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["features"].as_array().unwrap().len(), 36);
}

#[wasm_bindgen_test]
fn trip_map_rejects_bad_dataset() {
    assert!(TripMap::new(Some("{".to_string()), JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn free_geo_functions() {
    assert_eq!(tripmap_wasm::distance_km(43.8256, 87.6168, 43.8833, 88.1333), 42);
    let brg = tripmap_wasm::bearing_deg(43.8256, 87.6168, 43.8833, 88.1333);
    assert!((0.0..360.0).contains(&brg));
    assert_eq!(
        tripmap_wasm::interpolate(40.0, 80.0, 44.0, 90.0, 0.5),
        vec![42.0, 85.0]
    );
}

#[wasm_bindgen_test]
fn trip_map_listener_sees_each_change_once() {
    let seen: Rc<RefCell<Vec<Option<f64>>>> = Rc::default();
    let sink = seen.clone();
    let listener = Closure::<dyn FnMut(JsValue)>::new(move |day: JsValue| {
        sink.borrow_mut().push(day.as_f64());
    });

    let mut map = TripMap::new(None, JsValue::UNDEFINED).unwrap();
    map.on_select_day(listener.as_ref().unchecked_ref::<js_sys::Function>().clone());

    map.select_day(Some(3)).unwrap();
    map.select_day(Some(3)).unwrap();
    map.toggle_day(5).unwrap();
    map.toggle_day(5).unwrap();
    map.select_day(None).unwrap();

    assert_eq!(*seen.borrow(), vec![Some(3.0), Some(5.0), None]);
    drop(listener);
}

#[wasm_bindgen_test]
fn trip_map_throwing_listener_keeps_update() {
    let mut map = TripMap::new(None, JsValue::UNDEFINED).unwrap();
    map.on_select_day(js_sys::Function::new_no_args("throw new Error('boom')"));

    let update = map.select_day(Some(3)).unwrap();
    assert!(!update.is_null());
    assert_eq!(map.selected_day(), Some(3));

    let retired = js_sys::Reflect::get(&update, &JsValue::from_str("retired")).unwrap();
    assert_eq!(js_sys::Array::from(&retired).length(), 7 * 4);
}

#[wasm_bindgen_test]
fn trip_map_dispatch_popup_object() {
    let mut map = TripMap::new(None, JsValue::UNDEFINED).unwrap();
    let action = js_sys::JSON::parse(r#"{"type":"selectDay","day":4}"#).unwrap();

    let update = map.dispatch(action.clone()).unwrap();
    assert!(!update.is_null());
    assert_eq!(map.selected_day(), Some(4));

    assert!(map.dispatch(action).unwrap().is_null());

    let bogus = js_sys::JSON::parse(r#"{"type":"zoomTo","day":4}"#).unwrap();
    assert!(map.dispatch(bogus).is_err());
}

pub mod annotator;
pub mod converter;
pub mod dataset;
pub mod error;
pub mod geo_math;
pub mod map_view;
pub mod options;

use std::sync::Once;

use log::{info, warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::annotator::PopupAction;
use crate::dataset::Dataset;
use crate::geo_math::Coordinate;
use crate::map_view::{MapView, ViewUpdate};
use crate::options::MapOptions;

static START: Once = Once::new();

/// Route map state for one itinerary, driven from JavaScript.
#[wasm_bindgen]
pub struct TripMap {
    view: MapView,
    on_select: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl TripMap {
    /// Build from a dataset JSON string (the embedded trip when omitted)
    /// and an options object.
    #[wasm_bindgen(constructor)]
    pub fn new(dataset_json: Option<String>, options: JsValue) -> Result<TripMap, JsValue> {
        START.call_once(|| {
            // Fails only if the host page installed another logger first.
            let _ = console_log::init_with_level(log::Level::Info);
        });
        console_error_panic_hook::set_once();

        let opts = parse_options(options)?;
        let dataset = match dataset_json {
            Some(json) => Dataset::from_json(&json)?,
            None => Dataset::builtin()?,
        };
        info!(
            "loaded {} attractions over {} days",
            dataset.attractions.len(),
            dataset.days().len()
        );

        Ok(Self {
            view: MapView::new(dataset, opts)?,
            on_select: None,
        })
    }

    #[wasm_bindgen(getter = selectedDay)]
    pub fn selected_day(&self) -> Option<u32> {
        self.view.selected_day()
    }

    /// Register the listener told about every effective selection change.
    #[wasm_bindgen(js_name = onSelectDay)]
    pub fn on_select_day(&mut self, callback: js_sys::Function) {
        self.on_select = Some(callback);
    }

    /// Select a day, or clear the filter with `undefined`. Returns
    /// `{ retired, viewport }`, or `null` when nothing changed.
    #[wasm_bindgen(js_name = selectDay)]
    pub fn select_day(&mut self, day: Option<u32>) -> Result<JsValue, JsValue> {
        let update = self.view.select_day(day);
        self.publish(update)
    }

    /// Timeline click: selects `day`, or clears it when already selected.
    #[wasm_bindgen(js_name = toggleDay)]
    pub fn toggle_day(&mut self, day: u32) -> Result<JsValue, JsValue> {
        let update = self.view.toggle_day(day);
        self.publish(update)
    }

    /// Handle an `action` object taken from a label's popup detail.
    pub fn dispatch(&mut self, action: JsValue) -> Result<JsValue, JsValue> {
        let action: PopupAction =
            serde_wasm_bindgen::from_value(action).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let update = self.view.dispatch(action);
        self.publish(update)
    }

    /// Current overlays and attraction pins as a GeoJSON object.
    pub fn features(&self) -> Result<JsValue, JsValue> {
        to_js(&converter::to_feature_collection(&self.view))
    }

    /// Current overlays and attraction pins as a GeoJSON string.
    #[wasm_bindgen(js_name = featuresString)]
    pub fn features_string(&self) -> Result<String, JsValue> {
        serde_json::to_string(&converter::to_feature_collection(&self.view))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Last fitted viewport, `{ bounds, padding, maxZoom }`.
    pub fn viewport(&self) -> Result<JsValue, JsValue> {
        to_js(&self.view.viewport())
    }

    #[wasm_bindgen(js_name = initialView)]
    pub fn initial_view(&self) -> Result<JsValue, JsValue> {
        to_js(&self.view.initial_view())
    }

    /// Itinerary records, for the day timeline.
    pub fn itinerary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.view.dataset().itinerary)
    }
}

impl TripMap {
    /// The selection has already been applied, so a throwing listener is
    /// logged and the update is still handed back to the caller.
    fn publish(&self, update: Option<ViewUpdate>) -> Result<JsValue, JsValue> {
        let Some(update) = update else {
            return Ok(JsValue::NULL);
        };
        let js = to_js(&update)?;

        if let Some(callback) = &self.on_select {
            let day = match self.view.selected_day() {
                Some(d) => JsValue::from(d),
                None => JsValue::NULL,
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &day) {
                warn!("onSelectDay listener threw: {e:?}");
            }
        }

        Ok(js)
    }
}

/// Great-circle distance in whole kilometers.
#[wasm_bindgen(js_name = distanceKm)]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> u32 {
    geo_math::distance_km(Coordinate::new(lat1, lon1), Coordinate::new(lat2, lon2))
}

/// Initial bearing in degrees, clockwise from north.
#[wasm_bindgen(js_name = bearingDeg)]
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    geo_math::bearing_deg(Coordinate::new(lat1, lon1), Coordinate::new(lat2, lon2))
}

/// Point at fraction `t` between two coordinates, as `[lat, lon]`.
#[wasm_bindgen]
pub fn interpolate(lat1: f64, lon1: f64, lat2: f64, lon2: f64, t: f64) -> Vec<f64> {
    let c = geo_math::interpolate(Coordinate::new(lat1, lon1), Coordinate::new(lat2, lon2), t);
    vec![c.lat, c.lon]
}

fn parse_options(options: JsValue) -> Result<MapOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(MapOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Serialize into plain JS objects rather than `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in decimal degrees.
///
/// Serialized as a `[lat, lon]` pair, matching the dataset layout. GeoJSON
/// output flips this to `[lon, lat]` at the conversion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

/// Great-circle distance in kilometers, unrounded.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance rounded to the nearest kilometer.
pub fn distance_km(a: Coordinate, b: Coordinate) -> u32 {
    haversine_km(a, b).round() as u32
}

/// Initial compass bearing from `a` towards `b`, in `[0, 360)` degrees
/// clockwise from north.
pub fn bearing_deg(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    // atan2 yields [-180, 180]; shifting keeps the sum below 540 so the
    // remainder never lands on 360.
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Linear interpolation in degree space (not geodesic).
///
/// Written as a weighted sum so that `t = 0` and `t = 1` return the
/// endpoints bit-for-bit.
pub fn interpolate(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    Coordinate {
        lat: a.lat * (1.0 - t) + b.lat * t,
        lon: a.lon * (1.0 - t) + b.lon * t,
    }
}

/// Axis-aligned box in degree space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    /// Smallest box containing every coordinate, or `None` when empty.
    pub fn from_coordinates<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            south_west: first,
            north_east: first,
        };
        for c in iter {
            bounds.extend(c);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, c: Coordinate) {
        self.south_west.lat = self.south_west.lat.min(c.lat);
        self.south_west.lon = self.south_west.lon.min(c.lon);
        self.north_east.lat = self.north_east.lat.max(c.lat);
        self.north_east.lon = self.north_east.lon.max(c.lon);
    }
}

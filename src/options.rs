use serde::Deserialize;

use crate::error::TripMapError;
use crate::geo_math::Coordinate;

/// Options for route annotation and viewport fitting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    /// Per-day colors, indexed by `(day - 1) % len` (default: 7 hues)
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Where along each segment the direction arrows sit (default: [0.5, 0.75])
    #[serde(default = "default_arrow_fractions")]
    pub arrow_fractions: Vec<f64>,

    /// Pixel padding when fitting a single day (default: 100)
    #[serde(default = "default_day_padding")]
    pub day_padding: u32,

    /// Pixel padding when fitting the whole route (default: 80)
    #[serde(default = "default_overview_padding")]
    pub overview_padding: u32,

    /// Zoom cap when fitting a single day (default: 8)
    #[serde(default = "default_day_max_zoom")]
    pub day_max_zoom: u8,

    /// Map center before any fit, as [lat, lon] (default: [45.5, 86.5])
    #[serde(default = "default_initial_center")]
    pub initial_center: Coordinate,

    /// Zoom before any fit (default: 6)
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,

    /// Attach itinerary details to distance labels (default: true)
    #[serde(default = "default_true")]
    pub include_details: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            arrow_fractions: default_arrow_fractions(),
            day_padding: default_day_padding(),
            overview_padding: default_overview_padding(),
            day_max_zoom: default_day_max_zoom(),
            initial_center: default_initial_center(),
            initial_zoom: default_initial_zoom(),
            include_details: true,
        }
    }
}

impl MapOptions {
    /// Stable color for a 1-based day index.
    pub fn day_color(&self, day: u32) -> &str {
        let idx = day.saturating_sub(1) as usize % self.palette.len();
        &self.palette[idx]
    }

    /// Reject options the annotator cannot work with.
    pub fn validate(&self) -> Result<(), TripMapError> {
        if self.palette.is_empty() {
            return Err(TripMapError::Options("palette must not be empty".into()));
        }
        let in_unit = |t: f64| (0.0..=1.0).contains(&t);
        if !self.arrow_fractions.iter().copied().all(in_unit) {
            return Err(TripMapError::Options(
                "arrowFractions must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

fn default_palette() -> Vec<String> {
    [
        "#9E7FFF", "#38bdf8", "#f472b6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_arrow_fractions() -> Vec<f64> {
    vec![0.5, 0.75]
}

fn default_day_padding() -> u32 {
    100
}

fn default_overview_padding() -> u32 {
    80
}

fn default_day_max_zoom() -> u8 {
    8
}

fn default_initial_center() -> Coordinate {
    Coordinate::new(45.5, 86.5)
}

fn default_initial_zoom() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

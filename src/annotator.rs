use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dataset::{Attraction, Category, ItineraryDay};
use crate::geo_math::{self, Coordinate};
use crate::options::MapOptions;

/// A point on the route, one per attraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub id: String,
    pub coordinate: Coordinate,
    pub day: u32,
    pub category: Category,
}

impl From<&Attraction> for Waypoint {
    fn from(a: &Attraction) -> Self {
        Self {
            id: a.id.clone(),
            coordinate: a.coordinates,
            day: a.day,
            category: a.category,
        }
    }
}

/// Handle the rendering surface keys its layers by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    fn segment(from: &str, to: &str) -> Self {
        Self(format!("segment:{from}->{to}"))
    }

    fn arrow(from: &str, to: &str, n: usize) -> Self {
        Self(format!("arrow:{from}->{to}:{n}"))
    }

    fn label(from: &str, to: &str) -> Self {
        Self(format!("label:{from}->{to}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Action a popup button hands back to the map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PopupAction {
    SelectDay { day: u32 },
}

/// Connection between two chronologically adjacent waypoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub id: OverlayId,
    pub from: String,
    pub to: String,
    pub from_day: u32,
    /// Day the segment is attributed to: the day of its arriving waypoint.
    pub day: u32,
    pub path: [Coordinate; 2],
    pub distance_km: u32,
    pub bearing_deg: f64,
    pub color: String,
    /// Solid only for the selected day.
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowMarker {
    pub id: OverlayId,
    pub segment: OverlayId,
    pub position: Coordinate,
    pub rotation_deg: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLabel {
    pub id: OverlayId,
    pub segment: OverlayId,
    pub position: Coordinate,
    pub day: u32,
    pub distance_km: u32,
    pub color: String,
    /// Absent when the day has no itinerary record.
    pub detail: Option<DayDetail>,
}

/// Popup content bound to a distance label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    #[serde(flatten)]
    pub itinerary: ItineraryDay,
    pub distance_km: u32,
    pub action: PopupAction,
}

/// Everything the annotator asks the surface to draw for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySet {
    pub generation: u64,
    pub segments: Vec<RouteSegment>,
    pub arrows: Vec<ArrowMarker>,
    pub labels: Vec<DayLabel>,
}

impl OverlaySet {
    pub fn ids(&self) -> impl Iterator<Item = &OverlayId> {
        self.segments
            .iter()
            .map(|s| &s.id)
            .chain(self.arrows.iter().map(|a| &a.id))
            .chain(self.labels.iter().map(|l| &l.id))
    }

    pub fn len(&self) -> usize {
        self.segments.len() + self.arrows.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of swapping in a fresh overlay set.
#[derive(Debug, Clone)]
pub struct OverlayUpdate<'a> {
    /// Handles from the previous set; the surface removes all of them.
    pub retired: Vec<OverlayId>,
    pub current: &'a OverlaySet,
}

/// Owns the current overlay set and replaces it wholesale on every refresh.
#[derive(Debug, Default)]
pub struct RouteAnnotator {
    current: OverlaySet,
}

impl RouteAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &OverlaySet {
        &self.current
    }

    /// Recompute every overlay for `selected_day` and discard the old set.
    pub fn refresh(
        &mut self,
        waypoints: &[Waypoint],
        selected_day: Option<u32>,
        itinerary: &[ItineraryDay],
        opts: &MapOptions,
    ) -> OverlayUpdate<'_> {
        let mut next = annotate(waypoints, selected_day, itinerary, opts);
        next.generation = self.current.generation + 1;

        let previous = std::mem::replace(&mut self.current, next);
        OverlayUpdate {
            retired: previous.ids().cloned().collect(),
            current: &self.current,
        }
    }
}

/// Build segments, arrows and labels for the waypoints visible under
/// `selected_day`. A segment is visible when either endpoint is on the
/// selected day.
pub fn annotate(
    waypoints: &[Waypoint],
    selected_day: Option<u32>,
    itinerary: &[ItineraryDay],
    opts: &MapOptions,
) -> OverlaySet {
    let mut sorted: Vec<&Waypoint> = waypoints.iter().collect();
    // stable: same-day stops keep dataset order
    sorted.sort_by_key(|w| w.day);

    let mut set = OverlaySet::default();

    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);

        if let Some(day) = selected_day {
            if current.day != day && next.day != day {
                continue;
            }
        }

        let day = next.day;
        let (a, b) = (current.coordinate, next.coordinate);
        let distance_km = geo_math::distance_km(a, b);
        let bearing_deg = geo_math::bearing_deg(a, b);
        let color = opts.day_color(day).to_string();
        let segment_id = OverlayId::segment(&current.id, &next.id);

        for (n, &t) in opts.arrow_fractions.iter().enumerate() {
            set.arrows.push(ArrowMarker {
                id: OverlayId::arrow(&current.id, &next.id, n),
                segment: segment_id.clone(),
                position: geo_math::interpolate(a, b, t),
                rotation_deg: bearing_deg,
                color: color.clone(),
            });
        }

        let detail = if opts.include_details {
            day_detail(itinerary, day, distance_km)
        } else {
            None
        };

        set.labels.push(DayLabel {
            id: OverlayId::label(&current.id, &next.id),
            segment: segment_id.clone(),
            position: geo_math::interpolate(a, b, 0.5),
            day,
            distance_km,
            color: color.clone(),
            detail,
        });

        set.segments.push(RouteSegment {
            id: segment_id,
            from: current.id.clone(),
            to: next.id.clone(),
            from_day: current.day,
            day,
            path: [a, b],
            distance_km,
            bearing_deg,
            color,
            dashed: selected_day != Some(day),
        });
    }

    debug!(
        "annotated {} of {} waypoint pairs for day filter {:?}",
        set.segments.len(),
        sorted.len().saturating_sub(1),
        selected_day
    );

    set
}

fn day_detail(itinerary: &[ItineraryDay], day: u32, distance_km: u32) -> Option<DayDetail> {
    let Some(record) = itinerary.iter().find(|d| d.day == day) else {
        debug!("no itinerary record for day {day}, label left without detail");
        return None;
    };

    Some(DayDetail {
        itinerary: record.clone(),
        distance_km,
        action: PopupAction::SelectDay { day },
    })
}

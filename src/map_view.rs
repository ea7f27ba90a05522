use log::info;
use serde::Serialize;

use crate::annotator::{OverlayId, OverlaySet, PopupAction, RouteAnnotator, Waypoint};
use crate::dataset::{Attraction, Category, Dataset};
use crate::error::TripMapError;
use crate::geo_math::{Bounds, Coordinate};
use crate::options::MapOptions;

type Result<T> = std::result::Result<T, TripMapError>;

/// Bounds the surface should fit, with its fitting constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportFit {
    pub bounds: Bounds,
    /// Pixels on every side.
    pub padding: u32,
    pub max_zoom: Option<u8>,
}

/// Center and zoom used before the first fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InitialView {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Pin for one attraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractionMarker {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub position: Coordinate,
    pub day: u32,
    pub category: Category,
    pub symbol: &'static str,
    pub color: String,
    pub offset: [i32; 2],
    pub detail: AttractionDetail,
}

/// Popup content bound to an attraction pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractionDetail {
    pub description: String,
    pub highlights: Vec<String>,
    pub image: Option<String>,
    pub duration: Option<String>,
    /// Button that jumps to the attraction's day.
    pub action: PopupAction,
}

/// What changed after a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewUpdate {
    /// Overlay handles to remove before drawing [`MapView::overlays`].
    pub retired: Vec<OverlayId>,
    /// `None` leaves the viewport where it is.
    pub viewport: Option<ViewportFit>,
}

/// Day filter state plus everything derived from it.
#[derive(Debug)]
pub struct MapView {
    dataset: Dataset,
    waypoints: Vec<Waypoint>,
    options: MapOptions,
    selected_day: Option<u32>,
    annotator: RouteAnnotator,
    viewport: Option<ViewportFit>,
}

impl MapView {
    pub fn new(dataset: Dataset, options: MapOptions) -> Result<Self> {
        options.validate()?;

        let waypoints = dataset.attractions.iter().map(Waypoint::from).collect();
        let mut view = Self {
            dataset,
            waypoints,
            options,
            selected_day: None,
            annotator: RouteAnnotator::new(),
            viewport: None,
        };
        view.refresh();
        Ok(view)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selected_day(&self) -> Option<u32> {
        self.selected_day
    }

    pub fn overlays(&self) -> &OverlaySet {
        self.annotator.current()
    }

    /// Last fitted viewport.
    pub fn viewport(&self) -> Option<ViewportFit> {
        self.viewport
    }

    pub fn initial_view(&self) -> InitialView {
        InitialView {
            center: self.options.initial_center,
            zoom: self.options.initial_zoom,
        }
    }

    /// Single entry point for day selection. Returns `None` when `day` is
    /// already selected.
    pub fn select_day(&mut self, day: Option<u32>) -> Option<ViewUpdate> {
        if day == self.selected_day {
            return None;
        }

        match day {
            Some(d) => info!("selecting day {d}"),
            None => info!("clearing day filter"),
        }
        self.selected_day = day;
        Some(self.refresh())
    }

    /// Timeline behaviour: picking the selected day again clears the filter.
    pub fn toggle_day(&mut self, day: u32) -> Option<ViewUpdate> {
        if self.selected_day == Some(day) {
            self.select_day(None)
        } else {
            self.select_day(Some(day))
        }
    }

    /// Apply an action coming back from a popup.
    pub fn dispatch(&mut self, action: PopupAction) -> Option<ViewUpdate> {
        match action {
            PopupAction::SelectDay { day } => self.select_day(Some(day)),
        }
    }

    /// Viewport for the current filter: the selected day's waypoints, or the
    /// whole route. `None` when the selected day has no waypoints.
    pub fn fit_viewport(&self) -> Option<ViewportFit> {
        match self.selected_day {
            Some(day) => {
                let bounds = Bounds::from_coordinates(
                    self.dataset.attractions_on(day).map(|a| a.coordinates),
                )?;
                Some(ViewportFit {
                    bounds,
                    padding: self.options.day_padding,
                    max_zoom: Some(self.options.day_max_zoom),
                })
            }
            None => {
                let bounds = Bounds::from_coordinates(self.waypoints.iter().map(|w| w.coordinate))?;
                Some(ViewportFit {
                    bounds,
                    padding: self.options.overview_padding,
                    max_zoom: None,
                })
            }
        }
    }

    /// Attraction pins under the current filter.
    pub fn visible_attractions(&self) -> Vec<AttractionMarker> {
        let attractions: Vec<&Attraction> = match self.selected_day {
            Some(day) => self.dataset.attractions_on(day).collect(),
            None => self.dataset.attractions.iter().collect(),
        };

        attractions
            .into_iter()
            .map(|a| AttractionMarker {
                id: a.id.clone(),
                name: a.name.clone(),
                name_en: a.name_en.clone(),
                position: a.coordinates,
                day: a.day,
                category: a.category,
                symbol: a.category.symbol(),
                color: self.options.day_color(a.day).to_string(),
                offset: a.marker_offset,
                detail: AttractionDetail {
                    description: a.description.clone(),
                    highlights: a.highlights.clone(),
                    image: a.image.clone(),
                    duration: a.duration.clone(),
                    action: PopupAction::SelectDay { day: a.day },
                },
            })
            .collect()
    }

    fn refresh(&mut self) -> ViewUpdate {
        let update = self.annotator.refresh(
            &self.waypoints,
            self.selected_day,
            &self.dataset.itinerary,
            &self.options,
        );
        let retired = update.retired;

        let viewport = self.fit_viewport();
        if viewport.is_some() {
            self.viewport = viewport;
        }

        ViewUpdate { retired, viewport }
    }
}

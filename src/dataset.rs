use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TripMapError;
use crate::geo_math::Coordinate;

type Result<T> = std::result::Result<T, TripMapError>;

const BUILTIN_JSON: &str = include_str!("../data/xinjiang.json");

/// Attraction and itinerary records for one trip.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dataset {
    pub attractions: Vec<Attraction>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
}

/// A named stop on the map. One attraction per waypoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attraction {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    pub coordinates: Coordinate,
    pub day: u32,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    /// Pixel nudge applied by the surface to keep nearby pins apart.
    #[serde(default)]
    pub marker_offset: [i32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    City,
    Scenic,
    Lake,
    Mountain,
    Village,
}

impl Category {
    /// Lowercase name, as it appears in the dataset.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Scenic => "scenic",
            Self::Lake => "lake",
            Self::Mountain => "mountain",
            Self::Village => "village",
        }
    }

    /// Glyph shown inside the attraction pin.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::City => "🏙️",
            Self::Lake => "💧",
            Self::Mountain => "⛰️",
            Self::Village => "🏘️",
            Self::Scenic => "📸",
        }
    }
}

/// The detailed plan for one day of the trip.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub accommodation: Option<String>,
    #[serde(default)]
    pub meals: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Activity {
    pub time: String,
    pub activity: String,
    pub location: String,
}

impl Dataset {
    /// Parse a dataset from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        dataset.check_unique_ids()?;
        Ok(dataset)
    }

    /// The embedded seven-day Northern Xinjiang loop.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_JSON)
    }

    pub fn attractions_on(&self, day: u32) -> impl Iterator<Item = &Attraction> {
        self.attractions.iter().filter(move |a| a.day == day)
    }

    /// Distinct day indices that have at least one attraction, ascending.
    pub fn days(&self) -> Vec<u32> {
        let mut days: Vec<u32> = self.attractions.iter().map(|a| a.day).collect();
        days.sort_unstable();
        days.dedup();
        days
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for a in &self.attractions {
            if !seen.insert(a.id.as_str()) {
                return Err(TripMapError::DuplicateAttraction { id: a.id.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dataset() {
        let ds = Dataset::builtin().unwrap();
        assert_eq!(ds.attractions.len(), 8);
        assert_eq!(ds.itinerary.len(), 7);
        assert_eq!(ds.days(), vec![1, 2, 3, 4, 5, 6, 7]);

        let urumqi = &ds.attractions[0];
        assert_eq!(urumqi.id, "urumqi");
        assert_eq!(urumqi.name_en.as_deref(), Some("Urumqi"));
        assert_eq!(urumqi.coordinates, Coordinate::new(43.8256, 87.6168));
        assert_eq!(urumqi.category, Category::City);
        assert_eq!(urumqi.marker_offset, [0, 0]);

        let hemu = ds.attractions.iter().find(|a| a.id == "hemu").unwrap();
        assert_eq!(hemu.marker_offset, [8, -8]);
        assert_eq!(hemu.category, Category::Village);

        assert_eq!(ds.attractions_on(6).count(), 2);
        assert_eq!(ds.itinerary[2].day, 3);
        assert_eq!(ds.itinerary[2].activities.len(), 3);
    }

    #[test]
    fn test_minimal_json() {
        let json = r#"{
  "attractions": [
    { "id": "a", "name": "A", "coordinates": [10.0, 20.0], "day": 1, "type": "mountain" }
  ]
}"#;
        let ds = Dataset::from_json(json).unwrap();
        assert_eq!(ds.attractions[0].category, Category::Mountain);
        assert_eq!(ds.attractions[0].category.symbol(), "⛰️");
        assert_eq!(
            serde_json::to_value(ds.attractions[0].category).unwrap(),
            ds.attractions[0].category.as_str()
        );
        assert!(ds.itinerary.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"{
  "attractions": [
    { "id": "a", "name": "A", "coordinates": [10.0, 20.0], "day": 1, "type": "city" },
    { "id": "a", "name": "B", "coordinates": [11.0, 21.0], "day": 2, "type": "lake" }
  ]
}"#;
        let err = Dataset::from_json(json).unwrap_err();
        assert!(matches!(err, TripMapError::DuplicateAttraction { ref id } if id == "a"));
        assert_eq!(err.to_string(), "Duplicate attraction id 'a' in dataset");
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = r#"{"attractions": [
    { "id": "a", "name": "A", "coordinates": [10.0, 20.0], "day": 1, "type": "desert" }
]}"#;
        assert!(matches!(
            Dataset::from_json(json),
            Err(TripMapError::DatasetParse(_))
        ));
    }
}

//! Places and work-location matching.
//!
//! Work-location preferences arrive as free-form strings ("Houston, TX")
//! and are matched against an external place list case- and
//! punctuation-insensitively. The city token of a location string is its
//! substring before the first comma.

use serde::{Deserialize, Serialize};

/// A structured place, as returned by the place-resolution collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    /// Display name, e.g. `"Houston, TX"`.
    pub name: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Place {
    /// Build a place from an id and a `"City, Region"` display name,
    /// splitting the name into its city and region parts when possible.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let (city, region) = match name.split_once(',') {
            Some((city, region)) => (
                Some(city.trim().to_string()),
                Some(region.trim().to_string()).filter(|r| !r.is_empty()),
            ),
            None => (Some(name.trim().to_string()), None),
        };
        Self {
            id: id.into(),
            name,
            city,
            region,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_coords(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

// ---------------------------------------------------------------------------
// Matching helpers
// ---------------------------------------------------------------------------

/// Normalize a location string for matching: lowercase, alphanumerics only.
///
/// `"Ft. Worth, TX"` and `"ft worth tx"` normalize identically.
pub fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// The substring before the first comma, trimmed.
pub fn city_token(location: &str) -> &str {
    location.split(',').next().unwrap_or(location).trim()
}

/// Whether a selected work-location string and a listing's location string
/// refer to the same area.
///
/// The selected string's city token must appear (case-insensitively) in the
/// listing's location, or the listing's city token in the selected string.
pub fn locations_overlap(selected: &str, listing_location: &str) -> bool {
    let selected_city = city_token(selected).to_lowercase();
    let listing_city = city_token(listing_location).to_lowercase();
    if selected_city.is_empty() || listing_city.is_empty() {
        return false;
    }
    listing_location.to_lowercase().contains(&selected_city)
        || selected.to_lowercase().contains(&listing_city)
}

/// Result of matching free-form work-location preferences against the
/// external place list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkLocationMatch {
    /// Place ids for preferences that matched, in preference order.
    pub matched_ids: Vec<String>,
    /// Preferences with no counterpart in the place list.
    pub unmatched: Vec<String>,
}

/// Match each preference against the place list by normalized name.
///
/// Matching is case- and punctuation-insensitive; a preference matches at
/// most one place (the first with an identical normalized name).
pub fn match_work_locations(preferences: &[String], places: &[Place]) -> WorkLocationMatch {
    let mut result = WorkLocationMatch::default();
    for preference in preferences {
        let key = normalize_key(preference);
        if key.is_empty() {
            continue;
        }
        match places.iter().find(|p| normalize_key(&p.name) == key) {
            Some(place) => {
                if !result.matched_ids.contains(&place.id) {
                    result.matched_ids.push(place.id.clone());
                }
            }
            None => result.unmatched.push(preference.clone()),
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_splits_city_and_region() {
        let place = Place::new("houston-tx", "Houston, TX");
        assert_eq!(place.city.as_deref(), Some("Houston"));
        assert_eq!(place.region.as_deref(), Some("TX"));
    }

    #[test]
    fn new_without_comma_keeps_whole_name_as_city() {
        let place = Place::new("houston", "Houston");
        assert_eq!(place.city.as_deref(), Some("Houston"));
        assert_eq!(place.region, None);
    }

    #[test]
    fn normalize_strips_case_and_punctuation() {
        assert_eq!(normalize_key("Ft. Worth, TX"), "ftworthtx");
        assert_eq!(normalize_key("ft worth tx"), "ftworthtx");
        assert_eq!(normalize_key("  "), "");
    }

    #[test]
    fn city_token_takes_text_before_first_comma() {
        assert_eq!(city_token("Houston, TX"), "Houston");
        assert_eq!(city_token("Houston"), "Houston");
        assert_eq!(city_token(" San Antonio , TX, USA"), "San Antonio");
    }

    #[test]
    fn overlap_is_case_insensitive_on_the_city_token() {
        assert!(locations_overlap("houston, tx", "Houston, TX"));
        assert!(locations_overlap("Houston, TX", "Greater Houston Area"));
        assert!(!locations_overlap("Houston, TX", "Dallas, TX"));
    }

    #[test]
    fn overlap_works_in_either_direction() {
        // Listing city token appearing in the selected string.
        assert!(locations_overlap("Houston metro, TX", "Houston"));
    }

    #[test]
    fn empty_strings_never_overlap() {
        assert!(!locations_overlap("", "Houston, TX"));
        assert!(!locations_overlap("Houston, TX", ""));
    }

    #[test]
    fn match_work_locations_splits_matched_and_unmatched() {
        let places = vec![
            Place::new("houston-tx", "Houston, TX"),
            Place::new("dallas-tx", "Dallas, TX"),
        ];
        let prefs = vec![
            "houston tx".to_string(),
            "Springfield, IL".to_string(),
            "DALLAS, TX".to_string(),
        ];
        let matched = match_work_locations(&prefs, &places);
        assert_eq!(matched.matched_ids, vec!["houston-tx", "dallas-tx"]);
        assert_eq!(matched.unmatched, vec!["Springfield, IL"]);
    }

    #[test]
    fn match_work_locations_deduplicates_place_ids() {
        let places = vec![Place::new("houston-tx", "Houston, TX")];
        let prefs = vec!["Houston, TX".to_string(), "houston tx".to_string()];
        let matched = match_work_locations(&prefs, &places);
        assert_eq!(matched.matched_ids, vec!["houston-tx"]);
    }

    #[test]
    fn blank_preferences_are_ignored() {
        let places = vec![Place::new("houston-tx", "Houston, TX")];
        let prefs = vec!["   ".to_string()];
        let matched = match_work_locations(&prefs, &places);
        assert!(matched.matched_ids.is_empty());
        assert!(matched.unmatched.is_empty());
    }
}

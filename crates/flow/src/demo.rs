//! Demo-mode collaborators.
//!
//! Demo mode replaces every network-backed operation with a bounded
//! artificial delay and deterministic fabricated results, while the step
//! graph stays identical to production. The delay is the only
//! nondeterminism; payloads are constants.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rand::Rng;

use hirelane_core::place::Place;
use hirelane_core::recommend::{JobListing, RecommendationBuckets};

use crate::transport::{
    AuthTransport, FileRef, PlaceResolver, ProfileSummary, ProfileTransport, TransportError,
};

/// Token every demo session authenticates with.
pub const DEMO_TOKEN: &str = "demo-session-token";

/// Application id returned by the demo submission.
pub const DEMO_APPLICATION_ID: &str = "demo-application-1";

/// Hosted résumé URL the returning-user demo profile reports.
pub const DEMO_RESUME_URL: &str = "https://files.hirelane.example/resumes/demo.pdf";

const DELAY_MIN_MS: u64 = 300;
const DELAY_MAX_MS: u64 = 800;

/// The artificial delay every demo operation pays.
async fn demo_delay() {
    let ms = rand::rng().random_range(DELAY_MIN_MS..=DELAY_MAX_MS);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn demo_home() -> Place {
    Place::new("place-houston-tx", "Houston, TX").with_coords(29.7604, -95.3698)
}

fn demo_place_list() -> Vec<Place> {
    vec![
        Place::new("place-houston-tx", "Houston, TX").with_coords(29.7604, -95.3698),
        Place::new("place-dallas-tx", "Dallas, TX").with_coords(32.7767, -96.797),
        Place::new("place-austin-tx", "Austin, TX").with_coords(30.2672, -97.7431),
        Place::new("place-san-antonio-tx", "San Antonio, TX").with_coords(29.4241, -98.4936),
        Place::new("place-fort-worth-tx", "Fort Worth, TX").with_coords(32.7555, -97.3308),
    ]
}

/// Bundle the three demo collaborators.
pub fn demo_transports(
    returning: bool,
) -> (
    Arc<dyn AuthTransport>,
    Arc<dyn ProfileTransport>,
    Arc<dyn PlaceResolver>,
) {
    (
        Arc::new(DemoAuth),
        Arc::new(DemoProfile { returning }),
        Arc::new(DemoPlaces),
    )
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Accepts any phone and any code; always yields [`DEMO_TOKEN`].
pub struct DemoAuth;

#[async_trait]
impl AuthTransport for DemoAuth {
    async fn send_code(&self, phone_e164: &str) -> Result<(), TransportError> {
        demo_delay().await;
        tracing::debug!(phone = phone_e164, "Demo code sent");
        Ok(())
    }

    async fn check_code(&self, _phone_e164: &str, _code: &str) -> Result<String, TransportError> {
        demo_delay().await;
        Ok(DEMO_TOKEN.to_string())
    }

    async fn set_password(&self, _token: &str, _password: &str) -> Result<(), TransportError> {
        demo_delay().await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Simulated profile service. With `returning` set it reports a
/// pre-existing profile: a résumé on file, two roles, and a home location.
pub struct DemoProfile {
    pub returning: bool,
}

#[async_trait]
impl ProfileTransport for DemoProfile {
    async fn apply_to_job(&self, _token: &str, job_id: &str) -> Result<String, TransportError> {
        demo_delay().await;
        tracing::debug!(job_id, "Demo application submitted");
        Ok(DEMO_APPLICATION_ID.to_string())
    }

    async fn update_role_preferences(
        &self,
        _token: &str,
        _role_ids: &[String],
    ) -> Result<(), TransportError> {
        demo_delay().await;
        Ok(())
    }

    async fn update_work_location_preferences(
        &self,
        _token: &str,
        _place_ids: &[String],
    ) -> Result<(), TransportError> {
        demo_delay().await;
        Ok(())
    }

    async fn update_home_location(&self, _token: &str, _text: &str) -> Result<(), TransportError> {
        demo_delay().await;
        Ok(())
    }

    async fn upload_certification(
        &self,
        _token: &str,
        _file: &FileRef,
        _name: &str,
        _expires_at: Option<hirelane_core::types::Timestamp>,
    ) -> Result<(), TransportError> {
        demo_delay().await;
        Ok(())
    }

    async fn upload_resume(&self, _token: &str, _file: &FileRef) -> Result<String, TransportError> {
        demo_delay().await;
        Ok(DEMO_RESUME_URL.to_string())
    }

    async fn current_user(&self, _token: &str) -> Result<ProfileSummary, TransportError> {
        demo_delay().await;
        if !self.returning {
            return Ok(ProfileSummary::default());
        }
        Ok(ProfileSummary {
            resume_url: Some(DEMO_RESUME_URL.to_string()),
            role_ids: vec!["role-electrician".to_string(), "role-plumber".to_string()],
            certifications: vec!["OSHA 10".to_string()],
            home_location: Some(demo_home()),
            work_locations: vec!["Houston, TX".to_string()],
        })
    }
}

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// Searches a fixed city list; reverse geocoding always lands in Houston.
pub struct DemoPlaces;

#[async_trait]
impl PlaceResolver for DemoPlaces {
    async fn search(&self, text: &str) -> Vec<Place> {
        demo_delay().await;
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        demo_place_list()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> Option<Place> {
        demo_delay().await;
        Some(demo_home())
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Demo mode bypasses scoring and renders these fixed carousels.
pub fn demo_recommendations() -> RecommendationBuckets {
    let listing = |id: &str, title: &str, role: &str, location: &str, day: u32| JobListing {
        id: id.to_string(),
        title: title.to_string(),
        role_names: vec![role.to_string()],
        location: location.to_string(),
        created_at: Utc
            .with_ymd_and_hms(2026, 2, day, 9, 0, 0)
            .single()
            .expect("valid demo timestamp"),
    };

    RecommendationBuckets {
        best: vec![
            listing(
                "demo-listing-1",
                "Journeyman Electrician",
                "Electrician",
                "Houston, TX",
                12,
            ),
            listing(
                "demo-listing-2",
                "Commercial Plumber",
                "Plumber",
                "Houston, TX",
                9,
            ),
        ],
        additional: vec![
            listing(
                "demo-listing-3",
                "Industrial Electrician",
                "Electrician",
                "Dallas, TX",
                11,
            ),
            listing(
                "demo-listing-4",
                "Service Plumber",
                "Plumber",
                "Austin, TX",
                7,
            ),
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn check_code_yields_the_constant_token() {
        let auth = DemoAuth;
        let token = auth.check_code("+17135551234", "123456").await.unwrap();
        assert_eq!(token, DEMO_TOKEN);
    }

    #[tokio::test(start_paused = true)]
    async fn returning_profile_reports_a_resume_and_roles() {
        let profile = DemoProfile { returning: true };
        let summary = profile.current_user(DEMO_TOKEN).await.unwrap();
        assert_eq!(summary.resume_url.as_deref(), Some(DEMO_RESUME_URL));
        assert_eq!(summary.role_ids.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_profile_is_empty() {
        let profile = DemoProfile { returning: false };
        let summary = profile.current_user(DEMO_TOKEN).await.unwrap();
        assert_eq!(summary, ProfileSummary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn place_search_filters_the_fixed_list() {
        let places = DemoPlaces;
        let hits = places.search("hous").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Houston, TX");
        assert!(places.search("").await.is_empty());
    }

    #[test]
    fn demo_recommendation_buckets_are_fixed() {
        let buckets = demo_recommendations();
        assert_eq!(buckets.best.len(), 2);
        assert_eq!(buckets.additional.len(), 2);
        assert_eq!(buckets, demo_recommendations());
    }
}

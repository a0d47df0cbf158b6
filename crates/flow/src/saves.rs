//! Best-effort persistence shared by the two flows.

use futures::future::join;

use hirelane_core::place::{self, Place};

use crate::error::FlowWarning;
use crate::transport::ProfileTransport;

/// Persist the home location and the matched work-location ids.
///
/// The two saves run concurrently and settle independently: one failing
/// never cancels the other, and neither blocks advancing. Failures (and
/// unmatched preferences) come back as warnings.
pub(crate) async fn persist_location_selections(
    profile: &dyn ProfileTransport,
    token: &str,
    home: Option<&Place>,
    work_preferences: &[String],
    place_list: &[Place],
) -> Vec<FlowWarning> {
    let matched = place::match_work_locations(work_preferences, place_list);

    let mut warnings: Vec<FlowWarning> = matched
        .unmatched
        .iter()
        .map(|pref| {
            FlowWarning::new(
                "work_location_match",
                format!("No matching place for '{pref}'"),
            )
        })
        .collect();

    let home_save = async {
        match home {
            Some(place) => Some(profile.update_home_location(token, &place.name).await),
            None => None,
        }
    };
    let work_save = async {
        if matched.matched_ids.is_empty() {
            None
        } else {
            Some(
                profile
                    .update_work_location_preferences(token, &matched.matched_ids)
                    .await,
            )
        }
    };

    let (home_result, work_result) = join(home_save, work_save).await;

    if let Some(Err(e)) = home_result {
        tracing::warn!(error = %e, "Home location save failed; advancing anyway");
        warnings.push(FlowWarning::new("home_location", e.to_string()));
    }
    if let Some(Err(e)) = work_result {
        tracing::warn!(error = %e, "Work location save failed; advancing anyway");
        warnings.push(FlowWarning::new("work_locations", e.to_string()));
    }

    warnings
}

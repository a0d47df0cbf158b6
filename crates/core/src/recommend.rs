//! Recommendation scoring for the post-completion job carousels.
//!
//! On the claim flow's terminal step, the candidate listing set is
//! partitioned into "best matches" and "additional matches" using the
//! user's final role and work-location selections. Role ids are opaque;
//! matching happens on resolved role names.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::place::locations_overlap;
use crate::types::Timestamp;

/// Cap on each recommendation bucket.
pub const MAX_BUCKET: usize = 6;

/// A trade role from the role taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRole {
    pub id: String,
    pub name: String,
}

/// A candidate job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    /// Role names attached to the listing.
    pub role_names: Vec<String>,
    /// Free-form location string, e.g. `"Houston, TX"`.
    pub location: String,
    pub created_at: Timestamp,
}

/// The two carousels rendered on the completion view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationBuckets {
    /// Role match and location match.
    pub best: Vec<JobListing>,
    /// Role match only.
    pub additional: Vec<JobListing>,
}

/// Resolve selected role ids to names via the taxonomy.
///
/// Unknown ids are silently dropped; they cannot match anything.
fn resolve_role_names(selected_role_ids: &[String], taxonomy: &[TradeRole]) -> HashSet<String> {
    selected_role_ids
        .iter()
        .filter_map(|id| taxonomy.iter().find(|r| &r.id == id))
        .map(|r| r.name.clone())
        .collect()
}

/// Number of listing roles present in the selected-role-name set.
fn role_score(listing: &JobListing, selected_names: &HashSet<String>) -> usize {
    listing
        .role_names
        .iter()
        .filter(|name| selected_names.contains(*name))
        .count()
}

/// Whether any selected work location overlaps the listing's location.
fn location_matches(listing: &JobListing, work_locations: &[String]) -> bool {
    work_locations
        .iter()
        .any(|selected| locations_overlap(selected, &listing.location))
}

/// Sort by role score descending, then `created_at` descending, and cap.
fn sort_and_cap(mut scored: Vec<(usize, JobListing)>) -> Vec<JobListing> {
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.created_at.cmp(&a.1.created_at)));
    scored
        .into_iter()
        .take(MAX_BUCKET)
        .map(|(_, listing)| listing)
        .collect()
}

/// Partition `listings` into recommendation buckets.
///
/// With no work-location preferences the location partition is skipped
/// entirely and all role matches land in `best`.
pub fn recommend(
    listings: &[JobListing],
    selected_role_ids: &[String],
    taxonomy: &[TradeRole],
    work_locations: &[String],
) -> RecommendationBuckets {
    let selected_names = resolve_role_names(selected_role_ids, taxonomy);

    let mut role_matches: Vec<(usize, JobListing)> = listings
        .iter()
        .map(|listing| (role_score(listing, &selected_names), listing.clone()))
        .filter(|(score, _)| *score > 0)
        .collect();

    if work_locations.is_empty() {
        return RecommendationBuckets {
            best: sort_and_cap(role_matches),
            additional: Vec::new(),
        };
    }

    let mut near: Vec<(usize, JobListing)> = Vec::new();
    let mut elsewhere: Vec<(usize, JobListing)> = Vec::new();
    for (score, listing) in role_matches.drain(..) {
        if location_matches(&listing, work_locations) {
            near.push((score, listing));
        } else {
            elsewhere.push((score, listing));
        }
    }

    let best = sort_and_cap(near);
    let best_ids: HashSet<&str> = best.iter().map(|l| l.id.as_str()).collect();
    let additional = sort_and_cap(
        elsewhere
            .into_iter()
            .filter(|(_, l)| !best_ids.contains(l.id.as_str()))
            .collect(),
    );

    RecommendationBuckets { best, additional }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

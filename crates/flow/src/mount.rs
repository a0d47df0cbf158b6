//! Mount parameters.
//!
//! The host shell mounts a wizard with the entry URL's query string;
//! everything the wizard accepts from outside arrives here: mode flags,
//! the job context, prefills, an optional step hint, and opaque
//! attribution.

use std::collections::BTreeMap;

use hirelane_history::Location;

/// Parameters captured once at flow entry.
///
/// | Query key         | Field                |
/// |-------------------|----------------------|
/// | `step`            | `step` (hint)        |
/// | `demo`            | `demo`               |
/// | `demoReturning`   | `demo_returning`     |
/// | `whiteLabel`      | `white_label`        |
/// | `employerId`      | `employer_id`        |
/// | `jobId`           | `job_id`             |
/// | `jobSlug`         | `job_slug`           |
/// | `jobTitle`        | `job_title`          |
/// | `candidatePoolId` | `candidate_pool_id`  |
/// | `firstName`       | `first_name`         |
/// | `utm_*`           | `attribution`        |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountParams {
    /// Raw step slug from a deep link, validated by the flow.
    pub step: Option<String>,
    pub demo: bool,
    pub demo_returning: bool,
    pub white_label: bool,
    pub employer_id: Option<String>,
    pub job_id: Option<String>,
    pub job_slug: Option<String>,
    pub job_title: Option<String>,
    pub candidate_pool_id: Option<String>,
    pub first_name: Option<String>,
    /// Marketing/referral metadata, propagated unchanged and opaque to
    /// the wizard.
    pub attribution: BTreeMap<String, String>,
}

impl MountParams {
    pub fn from_location(location: &Location) -> Self {
        Self::from_query_pairs(
            location
                .query
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    pub fn from_query_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key {
                "step" => params.step = non_empty(value),
                "demo" => params.demo = parse_flag(value),
                "demoReturning" => params.demo_returning = parse_flag(value),
                "whiteLabel" => params.white_label = parse_flag(value),
                "employerId" => params.employer_id = non_empty(value),
                "jobId" => params.job_id = non_empty(value),
                "jobSlug" => params.job_slug = non_empty(value),
                "jobTitle" => params.job_title = non_empty(value),
                "candidatePoolId" => params.candidate_pool_id = non_empty(value),
                "firstName" => params.first_name = non_empty(value),
                _ if key.starts_with("utm_") => {
                    params
                        .attribution
                        .insert(key.to_string(), value.to_string());
                }
                _ => {}
            }
        }
        // A returning-user demo is still a demo.
        if params.demo_returning {
            params.demo = true;
        }
        params
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | ""
    )
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_prefills() {
        let params = MountParams::from_query_pairs([
            ("demo", "1"),
            ("whiteLabel", "true"),
            ("employerId", "emp-9"),
            ("jobId", "job-41"),
            ("jobSlug", "journeyman-electrician-houston"),
            ("firstName", "Sam"),
        ]);
        assert!(params.demo);
        assert!(params.white_label);
        assert!(!params.demo_returning);
        assert_eq!(params.employer_id.as_deref(), Some("emp-9"));
        assert_eq!(params.job_id.as_deref(), Some("job-41"));
        assert_eq!(params.first_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn demo_returning_implies_demo() {
        let params = MountParams::from_query_pairs([("demoReturning", "true")]);
        assert!(params.demo);
        assert!(params.demo_returning);
    }

    #[test]
    fn bare_flag_key_counts_as_set() {
        let params = MountParams::from_query_pairs([("demo", "")]);
        assert!(params.demo);
    }

    #[test]
    fn utm_pairs_are_captured_opaquely() {
        let params = MountParams::from_query_pairs([
            ("utm_source", "sms"),
            ("utm_campaign", "spring-outreach"),
            ("unrelated", "ignored"),
        ]);
        assert_eq!(params.attribution.len(), 2);
        assert_eq!(
            params.attribution.get("utm_source").map(String::as_str),
            Some("sms")
        );
    }

    #[test]
    fn from_location_reads_the_query() {
        let location = Location::parse("/jobs/apply?step=roles&demo=1&utm_source=sms");
        let params = MountParams::from_location(&location);
        assert_eq!(params.step.as_deref(), Some("roles"));
        assert!(params.demo);
        assert_eq!(params.attribution.len(), 1);
    }
}

//! Transition policy for the two wizards.
//!
//! Pure decision functions: given the current step and the relevant slice
//! of accumulated state, what comes next, what does "back" mean, and is
//! skip visible. All network side effects live in the flow engine; this
//! module only answers routing questions.

use crate::place::Place;
use crate::steps::{ApplyStep, ClaimStep};

// ---------------------------------------------------------------------------
// Forward edges
// ---------------------------------------------------------------------------

/// Next step after the apply flow's roles step.
///
/// With a job context the application has just been submitted, so the flow
/// branches on whether the profile already has a résumé on file: straight
/// to the terminal step, or to the optional résumé step. Without a job
/// context the default edge goes to `location`; the wizard bridge
/// intercepts that edge when the claim flow is driving.
pub fn apply_next_after_roles(has_job_context: bool, resume_on_file: bool) -> ApplyStep {
    if !has_job_context {
        return ApplyStep::Location;
    }
    if resume_on_file {
        ApplyStep::Confirm
    } else {
        ApplyStep::Resume
    }
}

/// Next step after the apply flow's location step (resume-or-confirm).
pub fn apply_next_after_location(resume_on_file: bool) -> ApplyStep {
    if resume_on_file {
        ApplyStep::Confirm
    } else {
        ApplyStep::Resume
    }
}

/// The claim flow's own next-step edge, as a pure function of the step.
///
/// Returns `None` on the terminal step.
pub fn claim_next(step: ClaimStep) -> Option<ClaimStep> {
    match step {
        ClaimStep::Landing => Some(ClaimStep::Phone),
        ClaimStep::Phone => Some(ClaimStep::Verify),
        ClaimStep::Verify => Some(ClaimStep::Password),
        ClaimStep::Password => Some(ClaimStep::Roles),
        ClaimStep::Roles => Some(ClaimStep::Certs),
        ClaimStep::Certs => Some(ClaimStep::Location),
        ClaimStep::Location => Some(ClaimStep::Resume),
        ClaimStep::Resume => Some(ClaimStep::Confirmation),
        ClaimStep::Confirmation => None,
    }
}

// ---------------------------------------------------------------------------
// Back edges
// ---------------------------------------------------------------------------

/// Back target for the apply flow.
///
/// Back is the inverse of the forward edge actually taken. `roles` always
/// backs to `password` (roles is reached only from password), and `verify`
/// backs to `phone` so the user re-enters the number, not the code. When a
/// job context made the forward path skip `location`, `resume` backs to
/// `roles`.
pub fn apply_back(step: ApplyStep, has_job_context: bool) -> Option<ApplyStep> {
    match step {
        ApplyStep::Phone => None,
        ApplyStep::Verify => Some(ApplyStep::Phone),
        ApplyStep::Password => Some(ApplyStep::Verify),
        ApplyStep::Roles => Some(ApplyStep::Password),
        ApplyStep::Location => Some(ApplyStep::Roles),
        ApplyStep::Resume => {
            if has_job_context {
                Some(ApplyStep::Roles)
            } else {
                Some(ApplyStep::Location)
            }
        }
        ApplyStep::Confirm => None,
    }
}

/// Back target for the claim flow.
pub fn claim_back(step: ClaimStep) -> Option<ClaimStep> {
    match step {
        ClaimStep::Landing => None,
        ClaimStep::Phone => Some(ClaimStep::Landing),
        ClaimStep::Verify => Some(ClaimStep::Phone),
        ClaimStep::Password => Some(ClaimStep::Verify),
        ClaimStep::Roles => Some(ClaimStep::Password),
        ClaimStep::Certs => Some(ClaimStep::Roles),
        ClaimStep::Location => Some(ClaimStep::Certs),
        ClaimStep::Resume => Some(ClaimStep::Location),
        ClaimStep::Confirmation => None,
    }
}

// ---------------------------------------------------------------------------
// Skip visibility
// ---------------------------------------------------------------------------

/// Skip is visible on the location step only while nothing is selected:
/// no home location and no work-location preferences.
pub fn location_skip_visible(home: Option<&Place>, work_locations: &[String]) -> bool {
    home.is_none() && work_locations.is_empty()
}

/// Skip is visible on the certifications step only while none is selected.
pub fn certs_skip_visible(certifications: &[String]) -> bool {
    certifications.is_empty()
}

/// The résumé step is always skippable.
pub fn resume_skip_visible() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Auth sub-flow
// ---------------------------------------------------------------------------

/// Once a token is set, the auth steps are permanently skippable for the
/// remainder of the session (until reset).
pub fn auth_complete(token: Option<&str>) -> bool {
    token.is_some_and(|t| !t.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{WizardStep, CLAIM_STEPS};

    #[test]
    fn apply_roles_branches_on_resume() {
        assert_eq!(apply_next_after_roles(true, false), ApplyStep::Resume);
        assert_eq!(apply_next_after_roles(true, true), ApplyStep::Confirm);
    }

    #[test]
    fn apply_roles_defaults_to_location_without_job_context() {
        assert_eq!(apply_next_after_roles(false, false), ApplyStep::Location);
        // The résumé check only applies once an application exists.
        assert_eq!(apply_next_after_roles(false, true), ApplyStep::Location);
    }

    #[test]
    fn apply_location_branches_on_resume() {
        assert_eq!(apply_next_after_location(false), ApplyStep::Resume);
        assert_eq!(apply_next_after_location(true), ApplyStep::Confirm);
    }

    #[test]
    fn claim_next_walks_the_whole_flow() {
        let mut step = ClaimStep::Landing;
        let mut visited = vec![step];
        while let Some(next) = claim_next(step) {
            visited.push(next);
            step = next;
        }
        assert_eq!(visited, CLAIM_STEPS);
    }

    #[test]
    fn claim_back_inverts_claim_next() {
        for step in CLAIM_STEPS {
            if let Some(next) = claim_next(*step) {
                assert_eq!(claim_back(next), Some(*step));
            }
        }
    }

    #[test]
    fn verify_backs_to_phone() {
        assert_eq!(apply_back(ApplyStep::Verify, false), Some(ApplyStep::Phone));
        assert_eq!(claim_back(ClaimStep::Verify), Some(ClaimStep::Phone));
    }

    #[test]
    fn roles_always_backs_to_password() {
        assert_eq!(
            apply_back(ApplyStep::Roles, true),
            Some(ApplyStep::Password)
        );
        assert_eq!(
            apply_back(ApplyStep::Roles, false),
            Some(ApplyStep::Password)
        );
        assert_eq!(claim_back(ClaimStep::Roles), Some(ClaimStep::Password));
    }

    #[test]
    fn apply_resume_back_depends_on_the_edge_taken() {
        // Job-context path skipped location on the way in.
        assert_eq!(apply_back(ApplyStep::Resume, true), Some(ApplyStep::Roles));
        assert_eq!(
            apply_back(ApplyStep::Resume, false),
            Some(ApplyStep::Location)
        );
    }

    #[test]
    fn terminals_and_entries_have_no_back() {
        assert_eq!(apply_back(ApplyStep::Phone, false), None);
        assert_eq!(apply_back(ApplyStep::Confirm, true), None);
        assert_eq!(claim_back(ClaimStep::Landing), None);
        assert_eq!(claim_back(ClaimStep::Confirmation), None);
    }

    #[test]
    fn location_skip_requires_both_empty() {
        let home = Place::new("houston-tx", "Houston, TX");
        assert!(location_skip_visible(None, &[]));
        assert!(!location_skip_visible(Some(&home), &[]));
        assert!(!location_skip_visible(None, &["Houston, TX".to_string()]));
    }

    #[test]
    fn certs_skip_only_when_empty() {
        assert!(certs_skip_visible(&[]));
        assert!(!certs_skip_visible(&["OSHA 10".to_string()]));
    }

    #[test]
    fn resume_is_always_skippable() {
        assert!(resume_skip_visible());
    }

    #[test]
    fn auth_complete_requires_nonempty_token() {
        assert!(!auth_complete(None));
        assert!(!auth_complete(Some("")));
        assert!(auth_complete(Some("tok-123")));
    }

    #[test]
    fn apply_back_never_skips_more_than_one_forward_edge() {
        // Going back must land exactly one transition earlier, never loop.
        for step in crate::steps::APPLY_STEPS {
            if let Some(prev) = apply_back(*step, false) {
                assert!(prev.ordinal() < step.ordinal());
            }
        }
    }
}

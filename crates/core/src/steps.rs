//! Step definitions for the two onboarding wizards.
//!
//! Each flow has a fixed set of steps. A step's slug doubles as its URL
//! encoding and its persisted representation, so an unknown slug can never
//! round-trip into a store document or an address-bar segment.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Common surface shared by both flows' step enums.
///
/// The history synchronizer and the stores are generic over this trait so
/// the two wizards can evolve independently while sharing one engine.
pub trait WizardStep: Copy + Eq + std::fmt::Debug {
    /// Human-readable flow name, used in error messages.
    const FLOW: &'static str;

    /// Slug used in URLs and persisted documents.
    fn as_slug(self) -> &'static str;

    /// Parse a slug back into a step.
    fn from_slug(slug: &str) -> Result<Self, CoreError>;

    /// The flow's entry step. In path-segment addressing this is the step
    /// that maps to the bare base path, with no extra segment.
    fn initial() -> Self;

    /// Whether the step may appear in the address bar at all.
    fn url_addressable(self) -> bool;

    /// 1-based position in the flow.
    fn ordinal(self) -> u8;

    /// Display progress percentage, from a fixed lookup table.
    fn progress_percent(self) -> u8;

    /// Whether the flow ends here (external navigation or a self-contained
    /// completion view).
    fn is_terminal(self) -> bool;
}

// ---------------------------------------------------------------------------
// Apply flow
// ---------------------------------------------------------------------------

/// Steps of the job-apply wizard.
///
/// The terminal `Confirm` step navigates away to an external confirmation
/// destination rather than rendering in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStep {
    Phone,
    Verify,
    Password,
    Roles,
    Location,
    Resume,
    Confirm,
}

/// All apply steps in flow order.
pub const APPLY_STEPS: &[ApplyStep] = &[
    ApplyStep::Phone,
    ApplyStep::Verify,
    ApplyStep::Password,
    ApplyStep::Roles,
    ApplyStep::Location,
    ApplyStep::Resume,
    ApplyStep::Confirm,
];

impl WizardStep for ApplyStep {
    const FLOW: &'static str = "apply";

    fn as_slug(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Verify => "verify",
            Self::Password => "password",
            Self::Roles => "roles",
            Self::Location => "location",
            Self::Resume => "resume",
            Self::Confirm => "confirm",
        }
    }

    fn from_slug(slug: &str) -> Result<Self, CoreError> {
        match slug {
            "phone" => Ok(Self::Phone),
            "verify" => Ok(Self::Verify),
            "password" => Ok(Self::Password),
            "roles" => Ok(Self::Roles),
            "location" => Ok(Self::Location),
            "resume" => Ok(Self::Resume),
            "confirm" => Ok(Self::Confirm),
            _ => Err(CoreError::UnknownStep {
                flow: Self::FLOW,
                value: slug.to_string(),
            }),
        }
    }

    fn initial() -> Self {
        Self::Phone
    }

    fn url_addressable(self) -> bool {
        true
    }

    fn ordinal(self) -> u8 {
        match self {
            Self::Phone => 1,
            Self::Verify => 2,
            Self::Password => 3,
            Self::Roles => 4,
            Self::Location => 5,
            Self::Resume => 6,
            Self::Confirm => 7,
        }
    }

    fn progress_percent(self) -> u8 {
        match self {
            Self::Phone | Self::Verify | Self::Password => 20,
            Self::Roles => 40,
            Self::Location => 60,
            Self::Resume => 80,
            Self::Confirm => 100,
        }
    }

    fn is_terminal(self) -> bool {
        self == Self::Confirm
    }
}

impl ApplyStep {
    /// The three steps of the shared authentication sub-flow.
    pub fn is_auth(self) -> bool {
        matches!(self, Self::Phone | Self::Verify | Self::Password)
    }
}

// ---------------------------------------------------------------------------
// Claim flow
// ---------------------------------------------------------------------------

/// Steps of the profile-claim wizard.
///
/// `Confirmation` is terminal and self-contained: it renders a completion
/// view (with recommendation carousels) instead of navigating away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStep {
    Landing,
    Phone,
    Verify,
    Password,
    Roles,
    Certs,
    Location,
    Resume,
    Confirmation,
}

/// All claim steps in flow order.
pub const CLAIM_STEPS: &[ClaimStep] = &[
    ClaimStep::Landing,
    ClaimStep::Phone,
    ClaimStep::Verify,
    ClaimStep::Password,
    ClaimStep::Roles,
    ClaimStep::Certs,
    ClaimStep::Location,
    ClaimStep::Resume,
    ClaimStep::Confirmation,
];

impl WizardStep for ClaimStep {
    const FLOW: &'static str = "claim";

    fn as_slug(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Phone => "phone",
            Self::Verify => "verify",
            Self::Password => "password",
            Self::Roles => "roles",
            Self::Certs => "certs",
            Self::Location => "location",
            Self::Resume => "resume",
            Self::Confirmation => "confirmation",
        }
    }

    fn from_slug(slug: &str) -> Result<Self, CoreError> {
        match slug {
            "landing" => Ok(Self::Landing),
            "phone" => Ok(Self::Phone),
            "verify" => Ok(Self::Verify),
            "password" => Ok(Self::Password),
            "roles" => Ok(Self::Roles),
            "certs" => Ok(Self::Certs),
            "location" => Ok(Self::Location),
            "resume" => Ok(Self::Resume),
            "confirmation" => Ok(Self::Confirmation),
            _ => Err(CoreError::UnknownStep {
                flow: Self::FLOW,
                value: slug.to_string(),
            }),
        }
    }

    fn initial() -> Self {
        Self::Landing
    }

    /// The landing step never appears as a URL segment; it maps to the
    /// flow's base path.
    fn url_addressable(self) -> bool {
        self != Self::Landing
    }

    fn ordinal(self) -> u8 {
        match self {
            Self::Landing => 1,
            Self::Phone => 2,
            Self::Verify => 3,
            Self::Password => 4,
            Self::Roles => 5,
            Self::Certs => 6,
            Self::Location => 7,
            Self::Resume => 8,
            Self::Confirmation => 9,
        }
    }

    fn progress_percent(self) -> u8 {
        match self {
            Self::Landing => 0,
            Self::Phone | Self::Verify | Self::Password => 15,
            Self::Roles => 30,
            Self::Certs => 45,
            Self::Location => 60,
            Self::Resume => 80,
            Self::Confirmation => 100,
        }
    }

    fn is_terminal(self) -> bool {
        self == Self::Confirmation
    }
}

impl ClaimStep {
    /// The three steps of the shared authentication sub-flow.
    pub fn is_auth(self) -> bool {
        matches!(self, Self::Phone | Self::Verify | Self::Password)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_slug_roundtrip() {
        for step in APPLY_STEPS {
            assert_eq!(ApplyStep::from_slug(step.as_slug()).unwrap(), *step);
        }
    }

    #[test]
    fn claim_slug_roundtrip() {
        for step in CLAIM_STEPS {
            assert_eq!(ClaimStep::from_slug(step.as_slug()).unwrap(), *step);
        }
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!(ApplyStep::from_slug("checkout").is_err());
        assert!(ApplyStep::from_slug("").is_err());
        assert!(ClaimStep::from_slug("confirm").is_err());
    }

    #[test]
    fn serde_uses_slugs() {
        let json = serde_json::to_string(&ApplyStep::Verify).unwrap();
        assert_eq!(json, "\"verify\"");
        let step: ClaimStep = serde_json::from_str("\"certs\"").unwrap();
        assert_eq!(step, ClaimStep::Certs);
    }

    #[test]
    fn serde_rejects_unknown_slug() {
        let result: Result<ApplyStep, _> = serde_json::from_str("\"landing\"");
        assert!(result.is_err());
    }

    #[test]
    fn ordinals_are_strictly_increasing() {
        for pair in APPLY_STEPS.windows(2) {
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
        for pair in CLAIM_STEPS.windows(2) {
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
    }

    #[test]
    fn progress_is_monotone_and_caps_at_100() {
        for pair in APPLY_STEPS.windows(2) {
            assert!(pair[0].progress_percent() <= pair[1].progress_percent());
        }
        for pair in CLAIM_STEPS.windows(2) {
            assert!(pair[0].progress_percent() <= pair[1].progress_percent());
        }
        assert_eq!(ApplyStep::Confirm.progress_percent(), 100);
        assert_eq!(ClaimStep::Confirmation.progress_percent(), 100);
    }

    #[test]
    fn apply_progress_table_fixed_points() {
        assert_eq!(ApplyStep::Phone.progress_percent(), 20);
        assert_eq!(ApplyStep::Verify.progress_percent(), 20);
        assert_eq!(ApplyStep::Password.progress_percent(), 20);
        assert_eq!(ApplyStep::Roles.progress_percent(), 40);
        assert_eq!(ApplyStep::Location.progress_percent(), 60);
        assert_eq!(ApplyStep::Resume.progress_percent(), 80);
    }

    #[test]
    fn landing_is_not_url_addressable() {
        assert!(!ClaimStep::Landing.url_addressable());
        for step in CLAIM_STEPS.iter().filter(|s| **s != ClaimStep::Landing) {
            assert!(step.url_addressable());
        }
    }

    #[test]
    fn terminals() {
        assert!(ApplyStep::Confirm.is_terminal());
        assert!(ClaimStep::Confirmation.is_terminal());
        assert!(!ApplyStep::Resume.is_terminal());
        assert!(!ClaimStep::Landing.is_terminal());
    }
}

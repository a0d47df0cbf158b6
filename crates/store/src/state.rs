//! Wizard state documents.
//!
//! One document per flow, serialized as JSON under a flow-specific storage
//! key. `Default` is the flow's initial literal state; `reset()` on the
//! store restores it wholesale. Unknown step slugs fail deserialization,
//! so a persisted document can never carry a step outside the flow's enum.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use hirelane_core::place::Place;
use hirelane_core::steps::{ApplyStep, ClaimStep, WizardStep};

/// Surface the generic store needs from a flow's state document.
pub trait FlowState:
    Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + 'static
{
    type Step: WizardStep + Send + Sync;

    /// Durable storage key for this flow's document.
    const STORAGE_KEY: &'static str;

    fn step(&self) -> Self::Step;
    fn set_step(&mut self, step: Self::Step);
    fn token(&self) -> Option<&str>;
}

/// Deduplicate while preserving first-occurrence order.
///
/// Selection setters have set semantics: re-adding a present value is a
/// no-op and duplicates are never stored.
pub(crate) fn dedupe_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Apply state
// ---------------------------------------------------------------------------

/// Accumulated state of the job-apply wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyState {
    pub step: ApplyStep,

    // Identity, populated by the shared auth sub-flow.
    pub phone: Option<String>,
    pub token: Option<String>,
    pub first_name: Option<String>,

    // Selections.
    pub role_ids: Vec<String>,
    pub home_location: Option<Place>,
    pub work_locations: Vec<String>,

    /// Marketing/referral metadata captured once at flow entry, opaque.
    pub attribution: BTreeMap<String, String>,

    // Mode flags.
    pub demo: bool,
    pub demo_returning: bool,
    pub white_label: bool,
    pub employer_id: Option<String>,

    // Job context: the target of this application.
    pub job_id: Option<String>,
    pub job_slug: Option<String>,

    /// Set once the application has been submitted.
    pub application_id: Option<String>,
    /// Résumé URL reported by the profile, if any; drives the
    /// resume-or-confirm branch.
    pub profile_resume_url: Option<String>,
}

impl Default for ApplyState {
    fn default() -> Self {
        Self {
            step: ApplyStep::Phone,
            phone: None,
            token: None,
            first_name: None,
            role_ids: Vec::new(),
            home_location: None,
            work_locations: Vec::new(),
            attribution: BTreeMap::new(),
            demo: false,
            demo_returning: false,
            white_label: false,
            employer_id: None,
            job_id: None,
            job_slug: None,
            application_id: None,
            profile_resume_url: None,
        }
    }
}

impl FlowState for ApplyState {
    type Step = ApplyStep;

    const STORAGE_KEY: &'static str = "hirelane.apply_wizard.v1";

    fn step(&self) -> ApplyStep {
        self.step
    }

    fn set_step(&mut self, step: ApplyStep) {
        self.step = step;
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl ApplyState {
    pub fn has_job_context(&self) -> bool {
        self.job_id.is_some()
    }

    pub fn resume_on_file(&self) -> bool {
        self.profile_resume_url.is_some()
    }
}

// ---------------------------------------------------------------------------
// Claim state
// ---------------------------------------------------------------------------

/// Accumulated state of the profile-claim wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimState {
    pub step: ClaimStep,

    // Identity, copied over from the apply store by the bridge.
    pub phone: Option<String>,
    pub token: Option<String>,
    pub first_name: Option<String>,

    // Selections.
    pub role_ids: Vec<String>,
    pub certifications: Vec<String>,
    pub home_location: Option<Place>,
    pub work_locations: Vec<String>,

    /// Marketing/referral metadata captured once at flow entry, opaque.
    pub attribution: BTreeMap<String, String>,

    // Mode flags.
    pub demo: bool,
    pub demo_returning: bool,
    pub white_label: bool,
    pub employer_id: Option<String>,

    /// Outreach campaign pool this claim arrived from, if any.
    pub candidate_pool_id: Option<String>,

    /// Résumé URL reported by the profile or set after upload.
    pub profile_resume_url: Option<String>,
}

impl Default for ClaimState {
    fn default() -> Self {
        Self {
            step: ClaimStep::Landing,
            phone: None,
            token: None,
            first_name: None,
            role_ids: Vec::new(),
            certifications: Vec::new(),
            home_location: None,
            work_locations: Vec::new(),
            attribution: BTreeMap::new(),
            demo: false,
            demo_returning: false,
            white_label: false,
            employer_id: None,
            candidate_pool_id: None,
            profile_resume_url: None,
        }
    }
}

impl FlowState for ClaimState {
    type Step = ClaimStep;

    const STORAGE_KEY: &'static str = "hirelane.claim_wizard.v1";

    fn step(&self) -> ClaimStep {
        self.step
    }

    fn set_step(&mut self, step: ClaimStep) {
        self.step = step;
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The wizard bridge.
//!
//! The claim flow reuses the apply flow's authentication steps instead of
//! duplicating them, so the two independently persisted stores must stay
//! consistent while the apply store is driving. Observation is
//! one-directional (apply → claim); the only reverse write is the
//! mount-time role seed so the shared roles component starts with the
//! claim flow's persisted defaults.

use hirelane_core::steps::{ApplyStep, ClaimStep, WizardStep};
use hirelane_store::{ApplyState, ClaimState};

/// What an observation pass wants applied to the claim store. Fields are
/// `None` when nothing should change.
#[derive(Debug, Default, PartialEq)]
pub struct BridgeEffect {
    pub token: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub role_ids: Option<Vec<String>>,
    pub step: Option<ClaimStep>,
}

impl BridgeEffect {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Observe the apply store after one of its transitions.
///
/// Two rules, both one-directional:
/// - Once the apply store has advanced past the auth sub-flow (reached
///   `password` with a token set), the identity fields are copied over and
///   the claim store catches up to `password`.
/// - Once the apply store signals a completed role selection (reached
///   `location` or `confirm`), the selected role ids are copied over and
///   the claim flow's own `roles → certs` edge fires, intercepting what
///   would otherwise be the apply flow's `roles → location` default.
pub fn observe(apply: &ApplyState, claim: &ClaimState) -> BridgeEffect {
    let mut effect = BridgeEffect::default();

    let auth_reached = apply.token.is_some()
        && apply.step.ordinal() >= ApplyStep::Password.ordinal();
    if auth_reached {
        if claim.token.is_none() {
            effect.token = apply.token.clone();
        }
        if claim.phone.is_none() {
            effect.phone = apply.phone.clone();
        }
        if claim.first_name.is_none() {
            effect.first_name = apply.first_name.clone();
        }
        if claim.step.ordinal() < ClaimStep::Password.ordinal() {
            effect.step = Some(ClaimStep::Password);
        }
    }

    let roles_complete =
        matches!(apply.step, ApplyStep::Location | ApplyStep::Confirm);
    if roles_complete {
        if !apply.role_ids.is_empty() && claim.role_ids != apply.role_ids {
            effect.role_ids = Some(apply.role_ids.clone());
        }
        if claim.step == ClaimStep::Roles {
            effect.step = hirelane_core::policy::claim_next(ClaimStep::Roles);
        }
    }

    effect
}

/// Mount-time seed, the bridge's only claim → apply write: the claim
/// flow's persisted role selection becomes the shared roles component's
/// starting selection, unless the apply store already has one.
pub fn seed_roles(claim: &ClaimState, apply: &ApplyState) -> Option<Vec<String>> {
    if apply.role_ids.is_empty() && !claim.role_ids.is_empty() {
        Some(claim.role_ids.clone())
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Pure domain logic for the candidate onboarding wizards.
//!
//! This crate has zero internal dependencies so it can be used by the
//! store, history, and flow layers alike. Everything here is a pure
//! function of its inputs: step graphs and transition policy, place
//! matching, phone normalization, and the recommendation scorer.

pub mod error;
pub mod phone;
pub mod place;
pub mod policy;
pub mod recommend;
pub mod steps;
pub mod types;

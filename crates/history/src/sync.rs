//! The history synchronizer.
//!
//! Keeps the store's `step` and the session history consistent in both
//! directions. Three independent forces interact here: the store may
//! rehydrate with a persisted step different from the default, genuine
//! user-driven transitions must push entries so back/forward works, and
//! naive pushing on every change would leave a phantom entry behind the
//! rehydration-driven one, breaking the back button on its first press.

use std::marker::PhantomData;

use serde_json::{json, Value};

use hirelane_core::steps::WizardStep;

use crate::device::HistoryDevice;
use crate::location::{AddressMode, Location};

/// Who caused a step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// A user-driven transition (next/back/skip controls, deep logic).
    Navigation,
    /// A browser back/forward event, already reflected in the history
    /// stack; must not push again.
    History,
}

pub struct Synchronizer<S: WizardStep> {
    mode: AddressMode,
    /// Whether the mount URL carried a recognized step, distinguishing a
    /// deep link from a fresh entry.
    step_seen_on_mount: bool,
    first_change_seen: bool,
    _step: PhantomData<S>,
}

impl<S: WizardStep> Synchronizer<S> {
    pub fn new(mode: AddressMode) -> Self {
        Self {
            mode,
            step_seen_on_mount: false,
            first_change_seen: false,
            _step: PhantomData,
        }
    }

    /// Mount against the current history entry.
    ///
    /// Reads the step encoded in the URL (recording whether one was
    /// present), then unconditionally rewrites the current entry to the
    /// canonical URL of the effective step, so the entry the user landed
    /// on is always canonical. Returns the deep-linked step, if any, for
    /// the caller to feed into the store.
    pub fn mount(&mut self, device: &mut dyn HistoryDevice, in_memory_step: S) -> Option<S> {
        let current = device.location();
        let url_step = self
            .mode
            .read_slug(&current)
            .and_then(|slug| S::from_slug(slug).ok());
        self.step_seen_on_mount = url_step.is_some();

        let effective = url_step.unwrap_or(in_memory_step);
        let canonical = self.mode.location_for(&current, self.slug_for(effective));
        device.replace(canonical, entry_state(effective));

        if let Some(step) = url_step {
            tracing::debug!(flow = S::FLOW, step = step.as_slug(), "Mounted on a deep link");
        }
        url_step
    }

    /// React to a store step change.
    ///
    /// History-driven changes are already reflected in the stack and only
    /// update the internal flags. Steps outside the allowed-for-URL set
    /// still correct the address back to the base (stale segments from a
    /// previous session must not linger) but never create an entry. The
    /// first change after a mount whose URL had no step is rehydration,
    /// not navigation: it replaces. Every later real change pushes.
    pub fn on_step_change(&mut self, device: &mut dyn HistoryDevice, step: S, source: ChangeSource) {
        let first_change = !self.first_change_seen;
        self.first_change_seen = true;

        if source == ChangeSource::History {
            return;
        }

        let current = device.location();
        let target = self.mode.location_for(&current, self.slug_for(step));

        if !step.url_addressable() {
            device.replace(target, entry_state(step));
            return;
        }

        if first_change && !self.step_seen_on_mount {
            tracing::debug!(flow = S::FLOW, step = step.as_slug(), "Rehydration step change");
            device.replace(target, entry_state(step));
        } else {
            device.push(target, entry_state(step));
        }
    }

    /// Resolve a browser back/forward event to a step.
    ///
    /// Prefers the entry's state payload; falls back to parsing the
    /// resulting URL. The caller applies the returned step to the store
    /// and reports it back through [`Self::on_step_change`] with
    /// [`ChangeSource::History`].
    pub fn handle_pop(&mut self, state: Option<&Value>, location: &Location) -> Option<S> {
        let from_state = state
            .and_then(|v| v.get("step"))
            .and_then(Value::as_str)
            .and_then(|slug| S::from_slug(slug).ok());

        let step = from_state.or_else(|| {
            self.mode
                .read_slug(location)
                .and_then(|slug| S::from_slug(slug).ok())
        });

        if step.is_none() {
            tracing::debug!(flow = S::FLOW, url = location.to_url(), "Ignoring pop with no step");
        }
        step
    }

    /// The slug a step contributes to the URL: none for non-addressable
    /// steps, and none for the initial step in path-segment mode (it maps
    /// to the bare base path).
    fn slug_for(&self, step: S) -> Option<&'static str> {
        if !step.url_addressable() {
            return None;
        }
        if matches!(self.mode, AddressMode::PathSegment { .. }) && step == S::initial() {
            return None;
        }
        Some(step.as_slug())
    }
}

fn entry_state<S: WizardStep>(step: S) -> Value {
    json!({ "step": step.as_slug() })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemoryHistory;
    use hirelane_core::steps::{ApplyStep, ClaimStep};
    use serde_json::json;

    fn query_sync() -> Synchronizer<ApplyStep> {
        Synchronizer::new(AddressMode::query("step"))
    }

    fn path_sync() -> Synchronizer<ClaimStep> {
        Synchronizer::new(AddressMode::path_segment("/start"))
    }

    #[test]
    fn mount_canonicalizes_without_pushing() {
        let mut device = MemoryHistory::new(Location::parse("/jobs/apply?utm_source=sms"));
        let mut sync = query_sync();

        let deep = sync.mount(&mut device, ApplyStep::Phone);
        assert_eq!(deep, None);
        assert_eq!(device.len(), 1);
        assert_eq!(
            device.current().location.to_url(),
            "/jobs/apply?utm_source=sms&step=phone"
        );
    }

    #[test]
    fn mount_returns_the_deep_linked_step() {
        let mut device = MemoryHistory::new(Location::parse("/jobs/apply?step=roles"));
        let mut sync = query_sync();

        let deep = sync.mount(&mut device, ApplyStep::Phone);
        assert_eq!(deep, Some(ApplyStep::Roles));
        assert_eq!(device.len(), 1);
        assert_eq!(device.current().location.query_value("step"), Some("roles"));
    }

    #[test]
    fn unrecognized_url_step_counts_as_absent() {
        let mut device = MemoryHistory::new(Location::parse("/jobs/apply?step=bogus"));
        let mut sync = query_sync();

        assert_eq!(sync.mount(&mut device, ApplyStep::Phone), None);
        // Canonicalized back to the in-memory step.
        assert_eq!(device.current().location.query_value("step"), Some("phone"));
    }

    #[test]
    fn first_change_replaces_then_later_changes_push() {
        let mut device = MemoryHistory::new(Location::parse("/jobs/apply"));
        let mut sync = query_sync();
        sync.mount(&mut device, ApplyStep::Phone);

        sync.on_step_change(&mut device, ApplyStep::Verify, ChangeSource::Navigation);
        assert_eq!(device.len(), 1);

        sync.on_step_change(&mut device, ApplyStep::Password, ChangeSource::Navigation);
        assert_eq!(device.len(), 2);

        sync.on_step_change(&mut device, ApplyStep::Roles, ChangeSource::Navigation);
        assert_eq!(device.len(), 3);
        assert_eq!(device.current().location.query_value("step"), Some("roles"));
    }

    #[test]
    fn deep_linked_mount_pushes_from_the_first_change() {
        let mut device = MemoryHistory::new(Location::parse("/jobs/apply?step=verify"));
        let mut sync = query_sync();
        sync.mount(&mut device, ApplyStep::Phone);

        sync.on_step_change(&mut device, ApplyStep::Password, ChangeSource::Navigation);
        assert_eq!(device.len(), 2);
    }

    #[test]
    fn history_driven_change_never_pushes() {
        let mut device = MemoryHistory::new(Location::parse("/jobs/apply"));
        let mut sync = query_sync();
        sync.mount(&mut device, ApplyStep::Phone);
        sync.on_step_change(&mut device, ApplyStep::Verify, ChangeSource::Navigation);
        sync.on_step_change(&mut device, ApplyStep::Password, ChangeSource::Navigation);
        let len_before = device.len();

        let entry = device.back().unwrap();
        let step = sync.handle_pop(Some(&entry.state), &entry.location).unwrap();
        assert_eq!(step, ApplyStep::Verify);

        sync.on_step_change(&mut device, step, ChangeSource::History);
        assert_eq!(device.len(), len_before);
    }

    #[test]
    fn pop_falls_back_to_the_url() {
        let mut sync = query_sync();
        let location = Location::parse("/jobs/apply?step=location");
        assert_eq!(
            sync.handle_pop(None, &location),
            Some(ApplyStep::Location)
        );
    }

    #[test]
    fn pop_without_a_recognizable_step_is_ignored() {
        let mut sync = query_sync();
        let location = Location::parse("/jobs/123");
        assert_eq!(sync.handle_pop(None, &location), None);
        assert_eq!(
            sync.handle_pop(Some(&json!({"step": "bogus"})), &location),
            None
        );
    }

    #[test]
    fn non_addressable_step_corrects_the_url_without_pushing() {
        let mut device = MemoryHistory::new(Location::parse("/start/roles"));
        let mut sync = path_sync();
        // Stale segment from a previous session; the store starts fresh.
        let deep = sync.mount(&mut device, ClaimStep::Landing);
        assert_eq!(deep, Some(ClaimStep::Roles));

        // The engine rejects the deep link (say, after reset) and lands on
        // the landing step.
        sync.on_step_change(&mut device, ClaimStep::Landing, ChangeSource::Navigation);
        assert_eq!(device.len(), 1);
        assert_eq!(device.current().location.path, "/start");
    }

    #[test]
    fn path_mode_initial_step_maps_to_the_base() {
        let mut device = MemoryHistory::new(Location::parse("/start"));
        let mut sync = path_sync();
        sync.mount(&mut device, ClaimStep::Landing);
        assert_eq!(device.current().location.path, "/start");

        sync.on_step_change(&mut device, ClaimStep::Phone, ChangeSource::Navigation);
        assert_eq!(device.current().location.path, "/start/phone");
    }

    #[test]
    fn back_and_forward_roundtrip_through_pop() {
        let mut device = MemoryHistory::new(Location::parse("/start"));
        let mut sync = path_sync();
        sync.mount(&mut device, ClaimStep::Landing);
        sync.on_step_change(&mut device, ClaimStep::Phone, ChangeSource::Navigation);
        sync.on_step_change(&mut device, ClaimStep::Verify, ChangeSource::Navigation);

        let back_entry = device.back().unwrap();
        let back_step = sync
            .handle_pop(Some(&back_entry.state), &back_entry.location)
            .unwrap();
        assert_eq!(back_step, ClaimStep::Phone);
        sync.on_step_change(&mut device, back_step, ChangeSource::History);

        let fwd_entry = device.forward().unwrap();
        let fwd_step = sync
            .handle_pop(Some(&fwd_entry.state), &fwd_entry.location)
            .unwrap();
        assert_eq!(fwd_step, ClaimStep::Verify);
        sync.on_step_change(&mut device, fwd_step, ChangeSource::History);

        assert_eq!(device.len(), 3);
    }
}

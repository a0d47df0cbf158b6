//! The wizard state store.
//!
//! Created lazily on first access, rehydrated from the storage port when a
//! persisted document exists, and written back after every mutation. All
//! mutations are last-write-wins field replacement; the two array-valued
//! selections take a whole new array (with set semantics applied here).
//! Step changes are observable through a watch channel so the history
//! synchronizer and the bridge can react without owning the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::watch;

use hirelane_core::place::Place;

use crate::state::{dedupe_preserving_order, ApplyState, ClaimState, FlowState};
use crate::storage::StateStorage;

pub struct WizardStore<S: FlowState> {
    state: S,
    storage: Arc<dyn StateStorage>,
    step_tx: watch::Sender<S::Step>,
}

impl<S: FlowState> WizardStore<S> {
    /// Open the store, rehydrating from the storage port if a document
    /// exists under the flow key. Unreadable documents are discarded in
    /// favor of the initial state.
    pub fn open(storage: Arc<dyn StateStorage>) -> Self {
        let state = match storage.load(S::STORAGE_KEY) {
            Ok(Some(doc)) => match serde_json::from_str::<S>(&doc) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(
                        key = S::STORAGE_KEY,
                        error = %e,
                        "Discarding unreadable persisted wizard state"
                    );
                    S::default()
                }
            },
            Ok(None) => S::default(),
            Err(e) => {
                tracing::warn!(
                    key = S::STORAGE_KEY,
                    error = %e,
                    "Storage read failed; starting from the initial state"
                );
                S::default()
            }
        };
        let (step_tx, _) = watch::channel(state.step());
        Self {
            state,
            storage,
            step_tx,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn step(&self) -> S::Step {
        self.state.step()
    }

    /// Observe step changes.
    pub fn subscribe(&self) -> watch::Receiver<S::Step> {
        self.step_tx.subscribe()
    }

    /// Apply a mutation, persist the document, and publish the (possibly
    /// unchanged) step.
    pub fn update(&mut self, mutate: impl FnOnce(&mut S)) {
        mutate(&mut self.state);
        self.persist();
        self.step_tx.send_replace(self.state.step());
    }

    pub fn set_step(&mut self, step: S::Step) {
        self.update(|s| s.set_step(step));
    }

    /// Restore every field to the flow's initial literal state and drop
    /// the persisted document so a fresh visit starts clean.
    pub fn reset(&mut self) {
        self.state = S::default();
        if let Err(e) = self.storage.remove(S::STORAGE_KEY) {
            tracing::warn!(
                key = S::STORAGE_KEY,
                error = %e,
                "Failed to clear persisted wizard state"
            );
        }
        self.step_tx.send_replace(self.state.step());
    }

    fn persist(&self) {
        match serde_json::to_string(&self.state) {
            Ok(doc) => {
                if let Err(e) = self.storage.save(S::STORAGE_KEY, &doc) {
                    tracing::warn!(
                        key = S::STORAGE_KEY,
                        error = %e,
                        "Failed to persist wizard state"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    key = S::STORAGE_KEY,
                    error = %e,
                    "Failed to serialize wizard state"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Apply setters
// ---------------------------------------------------------------------------

impl WizardStore<ApplyState> {
    pub fn set_phone(&mut self, phone: impl Into<String>) {
        let phone = phone.into();
        self.update(|s| s.phone = Some(phone));
    }

    /// The token is set at most once per flow instance; later writes are
    /// ignored until `reset`.
    pub fn set_token(&mut self, token: impl Into<String>) {
        if self.state.token.is_some() {
            tracing::debug!("Token already set for this flow instance; ignoring");
            return;
        }
        let token = token.into();
        self.update(|s| s.token = Some(token));
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        let first_name = first_name.into();
        self.update(|s| s.first_name = Some(first_name));
    }

    pub fn set_role_ids(&mut self, role_ids: Vec<String>) {
        let role_ids = dedupe_preserving_order(role_ids);
        self.update(|s| s.role_ids = role_ids);
    }

    pub fn set_home_location(&mut self, home: Option<Place>) {
        self.update(|s| s.home_location = home);
    }

    pub fn set_work_locations(&mut self, work_locations: Vec<String>) {
        let work_locations = dedupe_preserving_order(work_locations);
        self.update(|s| s.work_locations = work_locations);
    }

    /// Attribution is captured once at flow entry and then propagated
    /// unchanged; later captures are ignored.
    pub fn capture_attribution(&mut self, attribution: BTreeMap<String, String>) {
        if !self.state.attribution.is_empty() || attribution.is_empty() {
            return;
        }
        self.update(|s| s.attribution = attribution);
    }

    pub fn set_mode_flags(
        &mut self,
        demo: bool,
        demo_returning: bool,
        white_label: bool,
        employer_id: Option<String>,
    ) {
        self.update(|s| {
            s.demo = demo;
            s.demo_returning = demo_returning;
            s.white_label = white_label;
            s.employer_id = employer_id;
        });
    }

    pub fn set_job_context(&mut self, job_id: impl Into<String>, job_slug: Option<String>) {
        let job_id = job_id.into();
        self.update(|s| {
            s.job_id = Some(job_id);
            s.job_slug = job_slug;
        });
    }

    pub fn set_application_id(&mut self, application_id: impl Into<String>) {
        let application_id = application_id.into();
        self.update(|s| s.application_id = Some(application_id));
    }

    pub fn set_profile_resume_url(&mut self, url: Option<String>) {
        self.update(|s| s.profile_resume_url = url);
    }
}

// ---------------------------------------------------------------------------
// Claim setters
// ---------------------------------------------------------------------------

impl WizardStore<ClaimState> {
    pub fn set_phone(&mut self, phone: impl Into<String>) {
        let phone = phone.into();
        self.update(|s| s.phone = Some(phone));
    }

    /// The token is set at most once per flow instance; later writes are
    /// ignored until `reset`.
    pub fn set_token(&mut self, token: impl Into<String>) {
        if self.state.token.is_some() {
            tracing::debug!("Token already set for this flow instance; ignoring");
            return;
        }
        let token = token.into();
        self.update(|s| s.token = Some(token));
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        let first_name = first_name.into();
        self.update(|s| s.first_name = Some(first_name));
    }

    pub fn set_role_ids(&mut self, role_ids: Vec<String>) {
        let role_ids = dedupe_preserving_order(role_ids);
        self.update(|s| s.role_ids = role_ids);
    }

    pub fn set_certifications(&mut self, certifications: Vec<String>) {
        let certifications = dedupe_preserving_order(certifications);
        self.update(|s| s.certifications = certifications);
    }

    pub fn set_home_location(&mut self, home: Option<Place>) {
        self.update(|s| s.home_location = home);
    }

    pub fn set_work_locations(&mut self, work_locations: Vec<String>) {
        let work_locations = dedupe_preserving_order(work_locations);
        self.update(|s| s.work_locations = work_locations);
    }

    /// Attribution is captured once at flow entry and then propagated
    /// unchanged; later captures are ignored.
    pub fn capture_attribution(&mut self, attribution: BTreeMap<String, String>) {
        if !self.state.attribution.is_empty() || attribution.is_empty() {
            return;
        }
        self.update(|s| s.attribution = attribution);
    }

    pub fn set_mode_flags(
        &mut self,
        demo: bool,
        demo_returning: bool,
        white_label: bool,
        employer_id: Option<String>,
    ) {
        self.update(|s| {
            s.demo = demo;
            s.demo_returning = demo_returning;
            s.white_label = white_label;
            s.employer_id = employer_id;
        });
    }

    pub fn set_candidate_pool_id(&mut self, pool_id: Option<String>) {
        self.update(|s| s.candidate_pool_id = pool_id);
    }

    pub fn set_profile_resume_url(&mut self, url: Option<String>) {
        self.update(|s| s.profile_resume_url = url);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use hirelane_core::steps::{ApplyStep, ClaimStep};

    fn apply_store() -> (Arc<MemoryStorage>, WizardStore<ApplyState>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = WizardStore::<ApplyState>::open(storage.clone());
        (storage, store)
    }

    #[test]
    fn opens_with_initial_state_when_storage_is_empty() {
        let (_, store) = apply_store();
        assert_eq!(store.state(), &ApplyState::default());
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (storage, mut store) = apply_store();
        store.set_phone("+17135551234");

        let doc = storage.load(ApplyState::STORAGE_KEY).unwrap().unwrap();
        let persisted: ApplyState = serde_json::from_str(&doc).unwrap();
        assert_eq!(persisted.phone.as_deref(), Some("+17135551234"));
    }

    #[test]
    fn rehydrates_from_persisted_document() {
        let (storage, mut store) = apply_store();
        store.set_step(ApplyStep::Roles);
        store.set_token("tok-1");
        drop(store);

        let reopened = WizardStore::<ApplyState>::open(storage);
        assert_eq!(reopened.step(), ApplyStep::Roles);
        assert_eq!(reopened.state().token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn corrupt_document_falls_back_to_initial_state() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(ApplyState::STORAGE_KEY, "{not json").unwrap();

        let store = WizardStore::<ApplyState>::open(storage);
        assert_eq!(store.state(), &ApplyState::default());
    }

    #[test]
    fn token_is_set_at_most_once() {
        let (_, mut store) = apply_store();
        store.set_token("first");
        store.set_token("second");
        assert_eq!(store.state().token.as_deref(), Some("first"));
    }

    #[test]
    fn selection_setters_are_idempotent_and_deduplicate() {
        let (_, mut store) = apply_store();
        let roles = vec![
            "role-electrician".to_string(),
            "role-plumber".to_string(),
            "role-electrician".to_string(),
        ];
        store.set_role_ids(roles.clone());
        let first = store.state().role_ids.clone();
        store.set_role_ids(roles);
        assert_eq!(store.state().role_ids, first);
        assert_eq!(first, vec!["role-electrician", "role-plumber"]);
    }

    #[test]
    fn attribution_is_captured_once() {
        let (_, mut store) = apply_store();
        let mut first = BTreeMap::new();
        first.insert("utm_source".to_string(), "sms".to_string());
        store.capture_attribution(first.clone());

        let mut second = BTreeMap::new();
        second.insert("utm_source".to_string(), "email".to_string());
        store.capture_attribution(second);

        assert_eq!(store.state().attribution, first);
    }

    #[test]
    fn reset_restores_every_field_and_clears_storage() {
        let (storage, mut store) = apply_store();
        store.set_phone("+17135551234");
        store.set_token("tok-1");
        store.set_step(ApplyStep::Location);
        store.set_role_ids(vec!["role-electrician".into()]);

        store.reset();
        assert_eq!(store.state(), &ApplyState::default());
        assert!(storage.is_empty());
    }

    #[test]
    fn token_can_be_set_again_after_reset() {
        let (_, mut store) = apply_store();
        store.set_token("first");
        store.reset();
        store.set_token("second");
        assert_eq!(store.state().token.as_deref(), Some("second"));
    }

    #[test]
    fn subscribers_observe_step_changes() {
        let (_, mut store) = apply_store();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), ApplyStep::Phone);

        store.set_step(ApplyStep::Verify);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ApplyStep::Verify);
    }

    #[test]
    fn claim_store_certifications_deduplicate() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = WizardStore::<ClaimState>::open(storage);
        store.set_certifications(vec![
            "OSHA 10".to_string(),
            "OSHA 10".to_string(),
            "Journeyman License".to_string(),
        ]);
        assert_eq!(
            store.state().certifications,
            vec!["OSHA 10", "Journeyman License"]
        );
        assert_eq!(store.step(), ClaimStep::Landing);
    }
}

//! The job-apply flow engine.
//!
//! Drives the apply wizard's step machine over the transport ports,
//! funnels every state change through the persisted store, and mirrors
//! step changes into the attached history binding. The claim flow embeds
//! this engine for the shared auth and roles steps.

use std::sync::Arc;

use serde_json::Value;

use hirelane_core::place::Place;
use hirelane_core::steps::{ApplyStep, WizardStep};
use hirelane_core::{phone, policy};
use hirelane_history::{AddressMode, ChangeSource, HistoryDevice, Location};
use hirelane_store::{ApplyState, StateStorage, WizardStore};

use crate::binding::HistoryBinding;
use crate::error::{FlowError, FlowResult, FlowWarning, StepAdvance};
use crate::mount::MountParams;
use crate::saves::persist_location_selections;
use crate::transport::{AuthTransport, FileRef, PlaceResolver, ProfileSummary, ProfileTransport};

/// What the terminal view needs after the store has been reset.
///
/// Snapshotted before `reset()` fires because the view keeps rendering
/// with pre-reset values.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyCompletion {
    /// External confirmation destination, when a job context exists.
    pub destination: Option<String>,
    pub demo: bool,
    pub white_label: bool,
    pub employer_id: Option<String>,
}

pub struct ApplyFlow {
    store: WizardStore<ApplyState>,
    auth: Arc<dyn AuthTransport>,
    profile: Arc<dyn ProfileTransport>,
    places: Arc<dyn PlaceResolver>,
    history: Option<HistoryBinding<ApplyStep>>,
}

impl ApplyFlow {
    /// Open (or rehydrate) the apply store and capture the mount
    /// parameters: mode flags, job context, prefills, attribution.
    pub fn new(
        storage: Arc<dyn StateStorage>,
        auth: Arc<dyn AuthTransport>,
        profile: Arc<dyn ProfileTransport>,
        places: Arc<dyn PlaceResolver>,
        params: &MountParams,
    ) -> Self {
        let mut store = WizardStore::<ApplyState>::open(storage);
        store.set_mode_flags(
            params.demo,
            params.demo_returning,
            params.white_label,
            params.employer_id.clone(),
        );
        if let Some(job_id) = &params.job_id {
            store.set_job_context(job_id.clone(), params.job_slug.clone());
        }
        if let Some(first_name) = &params.first_name {
            if store.state().first_name.is_none() {
                store.set_first_name(first_name.clone());
            }
        }
        store.capture_attribution(params.attribution.clone());
        if let Some(hint) = &params.step {
            match ApplyStep::from_slug(hint) {
                Ok(step) => store.set_step(step),
                Err(e) => tracing::debug!(error = %e, "Ignoring unrecognized step hint"),
            }
        }

        Self {
            store,
            auth,
            profile,
            places,
            history: None,
        }
    }

    /// Bind to the host's history device.
    ///
    /// Reconciles the mount URL against the (possibly rehydrated, possibly
    /// stale) store step: a recognized step in the URL wins as a deep
    /// link, and the landed-on entry is rewritten to canonical form.
    pub fn attach_history(&mut self, mode: AddressMode, device: Box<dyn HistoryDevice>) {
        let mut binding = HistoryBinding::new(mode, device);
        if let Some(step) = binding.sync.mount(binding.device.as_mut(), self.store.step()) {
            self.store.set_step(step);
        }
        self.history = Some(binding);
    }

    /// Browser back/forward arrived from the host shell.
    pub fn handle_pop(&mut self, state: Option<&Value>, location: &Location) {
        let Some(binding) = &mut self.history else {
            return;
        };
        if let Some(step) = binding.sync.handle_pop(state, location) {
            self.store.set_step(step);
            binding
                .sync
                .on_step_change(binding.device.as_mut(), step, ChangeSource::History);
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn state(&self) -> &ApplyState {
        self.store.state()
    }

    pub fn step(&self) -> ApplyStep {
        self.store.step()
    }

    pub fn progress_percent(&self) -> u8 {
        self.store.step().progress_percent()
    }

    pub(crate) fn store_mut(&mut self) -> &mut WizardStore<ApplyState> {
        &mut self.store
    }

    // -- step submissions --------------------------------------------------

    /// Send the one-time code and advance to `verify`.
    pub async fn submit_phone(&mut self, raw_phone: &str) -> FlowResult<ApplyStep> {
        if policy::auth_complete(self.store.state().token.as_deref()) {
            // A token makes the auth steps pass-through for the session.
            self.transition(ApplyStep::Verify);
            return Ok(ApplyStep::Verify);
        }

        let e164 = phone::normalize_e164(raw_phone)?;
        self.auth.send_code(&e164).await?;
        self.store.set_phone(e164);
        self.transition(ApplyStep::Verify);
        Ok(ApplyStep::Verify)
    }

    /// Check the one-time code; success yields the session token and
    /// advances to `password`.
    pub async fn submit_code(&mut self, code: &str) -> FlowResult<ApplyStep> {
        if !policy::auth_complete(self.store.state().token.as_deref()) {
            let e164 = self
                .store
                .state()
                .phone
                .clone()
                .ok_or(FlowError::MissingPhone)?;
            let token = self.auth.check_code(&e164, code).await?;
            self.store.set_token(token);
            // Best-effort profile fetch: résumé-on-file drives the roles
            // branch, and an existing profile prefills selections.
            self.refresh_profile().await;
        }
        self.transition(ApplyStep::Password);
        Ok(ApplyStep::Password)
    }

    /// Set the password and advance to `roles`. A backend "already set"
    /// response is completion, not an error.
    pub async fn submit_password(&mut self, password: &str) -> FlowResult<ApplyStep> {
        let token = self.require_token()?;
        match self.auth.set_password(&token, password).await {
            Ok(()) => {}
            Err(crate::transport::TransportError::PasswordAlreadySet) => {
                tracing::debug!("Password already set; treating the step as complete");
            }
            Err(e) => return Err(e.into()),
        }
        self.transition(ApplyStep::Roles);
        Ok(ApplyStep::Roles)
    }

    /// Save the role selection; with a job context, submit the application
    /// and branch resume-or-confirm. Without one, take the default edge to
    /// `location` (the bridge intercepts this in claim usage).
    pub async fn submit_roles(
        &mut self,
        role_ids: Vec<String>,
    ) -> FlowResult<StepAdvance<ApplyStep>> {
        let token = self.require_token()?;
        self.store.set_role_ids(role_ids);
        let mut warnings = Vec::new();

        let saved_roles = self.store.state().role_ids.clone();
        if let Err(e) = self
            .profile
            .update_role_preferences(&token, &saved_roles)
            .await
        {
            tracing::warn!(error = %e, "Role preference save failed; advancing anyway");
            warnings.push(FlowWarning::new("role_preferences", e.to_string()));
        }

        let Some(job_id) = self.store.state().job_id.clone() else {
            self.transition(ApplyStep::Location);
            return Ok(StepAdvance {
                step: ApplyStep::Location,
                warnings,
            });
        };

        if self.store.state().application_id.is_none() {
            let application_id = self.profile.apply_to_job(&token, &job_id).await?;
            tracing::info!(job_id = %job_id, application_id = %application_id, "Application submitted");
            self.store.set_application_id(application_id);
        }

        let next = policy::apply_next_after_roles(true, self.store.state().resume_on_file());
        self.transition(next);
        Ok(StepAdvance {
            step: next,
            warnings,
        })
    }

    /// Save location selections (best-effort, concurrently) and branch
    /// resume-or-confirm.
    pub async fn submit_location(
        &mut self,
        home: Option<Place>,
        work_preferences: Vec<String>,
        place_list: &[Place],
    ) -> FlowResult<StepAdvance<ApplyStep>> {
        let token = self.require_token()?;

        let warnings = persist_location_selections(
            self.profile.as_ref(),
            &token,
            home.as_ref(),
            &work_preferences,
            place_list,
        )
        .await;

        self.store.set_home_location(home);
        self.store.set_work_locations(work_preferences);

        let next = policy::apply_next_after_location(self.store.state().resume_on_file());
        self.transition(next);
        Ok(StepAdvance {
            step: next,
            warnings,
        })
    }

    /// Upload the résumé (best-effort) or continue without one; both paths
    /// land on the terminal step.
    pub async fn submit_resume(
        &mut self,
        file: Option<&FileRef>,
    ) -> FlowResult<StepAdvance<ApplyStep>> {
        let mut warnings = Vec::new();
        if let Some(file) = file {
            let token = self.require_token()?;
            match self.profile.upload_resume(&token, file).await {
                Ok(url) => self.store.set_profile_resume_url(Some(url)),
                Err(e) => {
                    tracing::warn!(error = %e, "Résumé upload failed; advancing anyway");
                    warnings.push(FlowWarning::new("resume_upload", e.to_string()));
                }
            }
        }
        self.transition(ApplyStep::Confirm);
        Ok(StepAdvance {
            step: ApplyStep::Confirm,
            warnings,
        })
    }

    // -- back / skip -------------------------------------------------------

    /// Inverse of the forward edge actually taken, or `None` at the ends.
    pub fn back(&mut self) -> Option<ApplyStep> {
        let previous = policy::apply_back(self.store.step(), self.store.state().has_job_context())?;
        self.transition(previous);
        Some(previous)
    }

    /// Skip is visible only while the current step's selection is empty
    /// (and always on the résumé step; on auth steps once a token exists).
    pub fn can_skip(&self) -> bool {
        let state = self.store.state();
        match state.step {
            ApplyStep::Location => {
                policy::location_skip_visible(state.home_location.as_ref(), &state.work_locations)
            }
            ApplyStep::Resume => policy::resume_skip_visible(),
            // Re-visited auth entry steps are pass-through once a token
            // exists; the password step handles "already set" itself.
            ApplyStep::Phone | ApplyStep::Verify => {
                policy::auth_complete(state.token.as_deref())
            }
            _ => false,
        }
    }

    /// Advance with an empty payload, through the same logic as a normal
    /// submission.
    pub async fn skip(&mut self) -> FlowResult<StepAdvance<ApplyStep>> {
        if !self.can_skip() {
            return Err(FlowError::SkipUnavailable);
        }
        match self.store.step() {
            ApplyStep::Location => self.submit_location(None, Vec::new(), &[]).await,
            ApplyStep::Resume => self.submit_resume(None).await,
            ApplyStep::Phone => self.submit_phone("").await.map(StepAdvance::clean),
            ApplyStep::Verify => self.submit_code("").await.map(StepAdvance::clean),
            _ => Err(FlowError::SkipUnavailable),
        }
    }

    // -- places ------------------------------------------------------------

    /// Place search for the location step. Fails soft to empty.
    pub async fn search_places(&self, text: &str) -> Vec<Place> {
        self.places.search(text).await
    }

    /// Reverse geocoding for the "use my location" control. Fails soft.
    pub async fn locate(&self, latitude: f64, longitude: f64) -> Option<Place> {
        self.places.reverse_geocode(latitude, longitude).await
    }

    // -- terminal ----------------------------------------------------------

    /// The external confirmation destination, once a job context exists.
    pub fn confirm_destination(&self) -> Option<String> {
        let state = self.store.state();
        let job = state.job_slug.as_ref().or(state.job_id.as_ref())?;
        Some(format!("/jobs/{job}/application-confirmation"))
    }

    /// Snapshot the terminal view's inputs, then reset so a fresh visit
    /// starts clean.
    pub fn complete(&mut self) -> ApplyCompletion {
        let state = self.store.state();
        let completion = ApplyCompletion {
            destination: self.confirm_destination(),
            demo: state.demo,
            white_label: state.white_label,
            employer_id: state.employer_id.clone(),
        };
        self.store.reset();
        completion
    }

    // -- internals ---------------------------------------------------------

    /// Best-effort fetch of the current profile; prefills empty selections
    /// and records the résumé URL.
    pub async fn refresh_profile(&mut self) {
        let Some(token) = self.store.state().token.clone() else {
            return;
        };
        match self.profile.current_user(&token).await {
            Ok(summary) => self.absorb_profile(summary),
            Err(e) => {
                tracing::warn!(error = %e, "Profile fetch failed; continuing without prefill");
            }
        }
    }

    fn absorb_profile(&mut self, summary: ProfileSummary) {
        if summary.resume_url.is_some() {
            self.store.set_profile_resume_url(summary.resume_url.clone());
        }
        if self.store.state().role_ids.is_empty() && !summary.role_ids.is_empty() {
            self.store.set_role_ids(summary.role_ids);
        }
        if self.store.state().home_location.is_none() {
            if let Some(home) = summary.home_location {
                self.store.set_home_location(Some(home));
            }
        }
        if self.store.state().work_locations.is_empty() && !summary.work_locations.is_empty() {
            self.store.set_work_locations(summary.work_locations);
        }
    }

    fn require_token(&self) -> FlowResult<String> {
        self.store
            .state()
            .token
            .clone()
            .ok_or(FlowError::NotAuthenticated)
    }

    fn transition(&mut self, step: ApplyStep) {
        if self.store.step() == step {
            return;
        }
        self.store.set_step(step);
        if let Some(binding) = &mut self.history {
            binding
                .sync
                .on_step_change(binding.device.as_mut(), step, ChangeSource::Navigation);
        }
        tracing::info!(flow = "apply", step = step.as_slug(), "Step changed");
    }
}

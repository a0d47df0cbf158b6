//! The profile-claim flow engine.
//!
//! The claim wizard reuses the apply wizard's authentication and roles
//! steps rather than duplicating them: those submissions delegate to an
//! embedded [`ApplyFlow`] (carrying no job context), and the bridge copies
//! the results back into the claim store. Everything after roles is the
//! claim flow's own, up to the self-contained confirmation view with its
//! recommendation carousels.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use hirelane_core::place::Place;
use hirelane_core::policy;
use hirelane_core::recommend::{recommend, JobListing, RecommendationBuckets, TradeRole};
use hirelane_core::steps::{ClaimStep, WizardStep};
use hirelane_history::{AddressMode, ChangeSource, HistoryDevice, Location};
use hirelane_store::{ClaimState, StateStorage, WizardStore};

use crate::apply::ApplyFlow;
use crate::binding::HistoryBinding;
use crate::bridge;
use crate::demo::demo_recommendations;
use crate::error::{FlowError, FlowResult, FlowWarning, StepAdvance};
use crate::mount::MountParams;
use crate::saves::persist_location_selections;
use crate::transport::{AuthTransport, CertificationFile, FileRef, PlaceResolver, ProfileTransport};

/// What the self-contained confirmation view needs after the stores have
/// been reset.
///
/// Snapshotted before `reset()` fires because the view keeps rendering
/// with pre-reset values.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimCompletion {
    pub first_name: Option<String>,
    pub demo: bool,
    pub white_label: bool,
    pub employer_id: Option<String>,
    pub recommendations: RecommendationBuckets,
}

pub struct ClaimFlow {
    store: WizardStore<ClaimState>,
    /// The shared auth/roles sub-flow, driven on the claim flow's behalf.
    apply: ApplyFlow,
    profile: Arc<dyn ProfileTransport>,
    history: Option<HistoryBinding<ClaimStep>>,
}

impl ClaimFlow {
    /// Open (or rehydrate) both stores and capture the mount parameters.
    ///
    /// The embedded apply flow gets no job context, so its roles step
    /// takes the interceptable default edge. The claim flow's persisted
    /// role selection seeds the shared roles component (the bridge's only
    /// reverse write).
    pub fn new(
        storage: Arc<dyn StateStorage>,
        auth: Arc<dyn AuthTransport>,
        profile: Arc<dyn ProfileTransport>,
        places: Arc<dyn PlaceResolver>,
        params: &MountParams,
    ) -> Self {
        let mut store = WizardStore::<ClaimState>::open(storage.clone());
        store.set_mode_flags(
            params.demo,
            params.demo_returning,
            params.white_label,
            params.employer_id.clone(),
        );
        if params.candidate_pool_id.is_some() {
            store.set_candidate_pool_id(params.candidate_pool_id.clone());
        }
        if let Some(first_name) = &params.first_name {
            if store.state().first_name.is_none() {
                store.set_first_name(first_name.clone());
            }
        }
        store.capture_attribution(params.attribution.clone());
        if let Some(hint) = &params.step {
            match ClaimStep::from_slug(hint) {
                Ok(step) => store.set_step(step),
                Err(e) => tracing::debug!(error = %e, "Ignoring unrecognized step hint"),
            }
        }

        let embedded = MountParams {
            step: None,
            job_id: None,
            job_slug: None,
            job_title: None,
            ..params.clone()
        };
        let mut apply = ApplyFlow::new(storage, auth, profile.clone(), places, &embedded);

        if let Some(roles) = bridge::seed_roles(store.state(), apply.state()) {
            apply.store_mut().set_role_ids(roles);
        }

        Self {
            store,
            apply,
            profile,
            history: None,
        }
    }

    /// Bind to the host's history device; a recognized step in the mount
    /// URL wins over possibly stale persisted state.
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

    pub fn state(&self) -> &ClaimState {
        self.store.state()
    }

    pub fn step(&self) -> ClaimStep {
        self.store.step()
    }

    pub fn progress_percent(&self) -> u8 {
        self.store.step().progress_percent()
    }

    /// The shared sub-flow's accumulated state (e.g. the roles component's
    /// current selection).
    pub fn shared(&self) -> &ApplyFlow {
        &self.apply
    }

    // -- step submissions --------------------------------------------------

    /// Landing CTA: enter the auth sub-flow.
    pub fn start(&mut self) -> ClaimStep {
        self.transition(ClaimStep::Phone);
        ClaimStep::Phone
    }

    pub async fn submit_phone(&mut self, raw_phone: &str) -> FlowResult<ClaimStep> {
        self.apply.submit_phone(raw_phone).await?;
        self.absorb_apply();
        self.transition(ClaimStep::Verify);
        Ok(self.store.step())
    }

    pub async fn submit_code(&mut self, code: &str) -> FlowResult<ClaimStep> {
        self.apply.submit_code(code).await?;
        // Bridge rule: the apply store just passed the auth sub-flow, so
        // identity lands here and the claim step catches up to password.
        self.absorb_apply();
        self.refresh_profile().await;
        Ok(self.store.step())
    }

    pub async fn submit_password(&mut self, password: &str) -> FlowResult<ClaimStep> {
        self.apply.submit_password(password).await?;
        self.absorb_apply();
        if self.store.step() == ClaimStep::Password {
            self.transition(ClaimStep::Roles);
        }
        Ok(self.store.step())
    }

    /// Save the role selection through the shared sub-flow. The apply
    /// store takes its default `roles → location` edge; the bridge
    /// intercepts it and fires this flow's own `roles → certs`.
    pub async fn submit_roles(
        &mut self,
        role_ids: Vec<String>,
    ) -> FlowResult<StepAdvance<ClaimStep>> {
        let advance = self.apply.submit_roles(role_ids).await?;
        self.absorb_apply();
        Ok(StepAdvance {
            step: self.store.step(),
            warnings: advance.warnings,
        })
    }

    /// Save the certification selection and upload any attached files
    /// (best-effort, settle-all), then advance to location.
    pub async fn submit_certifications(
        &mut self,
        certifications: Vec<String>,
        files: Vec<CertificationFile>,
    ) -> FlowResult<StepAdvance<ClaimStep>> {
        self.store.set_certifications(certifications);
        let mut warnings = Vec::new();

        if !files.is_empty() {
            let token = self.require_token()?;
            let uploads = files.iter().map(|cert| {
                self.profile
                    .upload_certification(&token, &cert.file, &cert.name, cert.expires_at)
            });
            for (cert, result) in files.iter().zip(join_all(uploads).await) {
                if let Err(e) = result {
                    tracing::warn!(
                        certification = %cert.name,
                        error = %e,
                        "Certification upload failed; advancing anyway"
                    );
                    warnings.push(FlowWarning::new("certification_upload", e.to_string()));
                }
            }
        }

        self.transition(ClaimStep::Location);
        Ok(StepAdvance {
            step: ClaimStep::Location,
            warnings,
        })
    }

    /// Save location selections (best-effort, concurrently) and advance
    /// to the résumé step.
    pub async fn submit_location(
        &mut self,
        home: Option<Place>,
        work_preferences: Vec<String>,
        place_list: &[Place],
    ) -> FlowResult<StepAdvance<ClaimStep>> {
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

        self.transition(ClaimStep::Resume);
        Ok(StepAdvance {
            step: ClaimStep::Resume,
            warnings,
        })
    }

    /// Upload the résumé (best-effort) or continue without one; both
    /// paths land on the confirmation step.
    pub async fn submit_resume(
        &mut self,
        file: Option<&FileRef>,
    ) -> FlowResult<StepAdvance<ClaimStep>> {
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
        self.transition(ClaimStep::Confirmation);
        Ok(StepAdvance {
            step: ClaimStep::Confirmation,
            warnings,
        })
    }

    // -- back / skip -------------------------------------------------------

    /// Inverse of the forward edge actually taken, or `None` at the ends.
    pub fn back(&mut self) -> Option<ClaimStep> {
        let previous = policy::claim_back(self.store.step())?;
        self.transition(previous);
        Some(previous)
    }

    /// Skip is visible only while the current step's selection is empty
    /// (and always on the résumé step; on auth entry steps once a token
    /// exists).
    pub fn can_skip(&self) -> bool {
        let state = self.store.state();
        match state.step {
            ClaimStep::Certs => policy::certs_skip_visible(&state.certifications),
            ClaimStep::Location => {
                policy::location_skip_visible(state.home_location.as_ref(), &state.work_locations)
            }
            ClaimStep::Resume => policy::resume_skip_visible(),
            ClaimStep::Phone | ClaimStep::Verify => {
                policy::auth_complete(state.token.as_deref())
            }
            _ => false,
        }
    }

    /// Advance with an empty payload, through the same logic as a normal
    /// submission.
    pub async fn skip(&mut self) -> FlowResult<StepAdvance<ClaimStep>> {
        if !self.can_skip() {
            return Err(FlowError::SkipUnavailable);
        }
        match self.store.step() {
            ClaimStep::Certs => self.submit_certifications(Vec::new(), Vec::new()).await,
            ClaimStep::Location => self.submit_location(None, Vec::new(), &[]).await,
            ClaimStep::Resume => self.submit_resume(None).await,
            ClaimStep::Phone => self.submit_phone("").await.map(StepAdvance::clean),
            ClaimStep::Verify => self.submit_code("").await.map(StepAdvance::clean),
            _ => Err(FlowError::SkipUnavailable),
        }
    }

    // -- places ------------------------------------------------------------

    /// Place search for the location step. Fails soft to empty.
    pub async fn search_places(&self, text: &str) -> Vec<Place> {
        self.apply.search_places(text).await
    }

    /// Reverse geocoding for the "use my location" control. Fails soft.
    pub async fn locate(&self, latitude: f64, longitude: f64) -> Option<Place> {
        self.apply.locate(latitude, longitude).await
    }

    // -- terminal ----------------------------------------------------------

    /// Build the confirmation view's inputs (recommendation carousels
    /// included), then reset both stores so a fresh visit starts clean.
    pub fn complete(
        &mut self,
        listings: &[JobListing],
        taxonomy: &[TradeRole],
    ) -> ClaimCompletion {
        let state = self.store.state();
        let recommendations = if state.demo {
            demo_recommendations()
        } else {
            recommend(listings, &state.role_ids, taxonomy, &state.work_locations)
        };
        let completion = ClaimCompletion {
            first_name: state.first_name.clone(),
            demo: state.demo,
            white_label: state.white_label,
            employer_id: state.employer_id.clone(),
            recommendations,
        };
        // The claim flow drove the apply store through the shared steps;
        // both start clean on the next visit.
        self.store.reset();
        self.apply.store_mut().reset();
        completion
    }

    // -- internals ---------------------------------------------------------

    /// Best-effort profile fetch for claim-specific prefill (returning
    /// users arrive with roles, certifications, and a home location).
    pub async fn refresh_profile(&mut self) {
        let Some(token) = self.store.state().token.clone() else {
            return;
        };
        match self.profile.current_user(&token).await {
            Ok(summary) => {
                if summary.resume_url.is_some() {
                    self.store.set_profile_resume_url(summary.resume_url);
                }
                if self.store.state().certifications.is_empty() && !summary.certifications.is_empty()
                {
                    self.store.set_certifications(summary.certifications);
                }
                if self.store.state().home_location.is_none() {
                    if let Some(home) = summary.home_location {
                        self.store.set_home_location(Some(home));
                    }
                }
                if self.store.state().work_locations.is_empty()
                    && !summary.work_locations.is_empty()
                {
                    self.store.set_work_locations(summary.work_locations);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile fetch failed; continuing without prefill");
            }
        }
    }

    /// Apply one bridge observation pass to the claim store.
    fn absorb_apply(&mut self) {
        let effect = bridge::observe(self.apply.state(), self.store.state());
        if let Some(token) = effect.token {
            self.store.set_token(token);
        }
        if let Some(phone) = effect.phone {
            self.store.set_phone(phone);
        }
        if let Some(first_name) = effect.first_name {
            self.store.set_first_name(first_name);
        }
        if let Some(role_ids) = effect.role_ids {
            self.store.set_role_ids(role_ids);
        }
        if let Some(step) = effect.step {
            self.transition(step);
        }
    }

    fn require_token(&self) -> FlowResult<String> {
        self.store
            .state()
            .token
            .clone()
            .ok_or(FlowError::NotAuthenticated)
    }

    fn transition(&mut self, step: ClaimStep) {
        if self.store.step() == step {
            return;
        }
        self.store.set_step(step);
        if let Some(binding) = &mut self.history {
            binding
                .sync
                .on_step_change(binding.device.as_mut(), step, ChangeSource::Navigation);
        }
        tracing::info!(flow = "claim", step = step.as_slug(), "Step changed");
    }
}

//! Transport ports for the external collaborators.
//!
//! The wizard consumes auth, profile, and place services through these
//! traits only; the host shell wires in real implementations, tests and
//! demo mode wire in fakes. Contracts are deliberately narrow: the wizard
//! never sees transport internals, token formats, or upload mechanics.

use async_trait::async_trait;

use hirelane_core::place::Place;
use hirelane_core::types::Timestamp;

/// Errors surfaced by any transport call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The backend reports the password is already set. The flow treats
    /// this as completion of the password step, not as a failure.
    #[error("Password already set")]
    PasswordAlreadySet,
}

/// Opaque handle to a file picked by the user. Upload mechanics live
/// behind the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
}

impl FileRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A certification the user attached on the certs step.
#[derive(Debug, Clone)]
pub struct CertificationFile {
    pub file: FileRef,
    /// Certification name, e.g. `"OSHA 10"`.
    pub name: String,
    pub expires_at: Option<Timestamp>,
}

/// What the profile service knows about the current user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSummary {
    pub resume_url: Option<String>,
    pub role_ids: Vec<String>,
    pub certifications: Vec<String>,
    pub home_location: Option<Place>,
    pub work_locations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Phone-code authentication.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    async fn send_code(&self, phone_e164: &str) -> Result<(), TransportError>;

    /// Check the one-time code; success yields the session token.
    async fn check_code(&self, phone_e164: &str, code: &str) -> Result<String, TransportError>;

    async fn set_password(&self, token: &str, password: &str) -> Result<(), TransportError>;
}

/// Candidate profile persistence.
#[async_trait]
pub trait ProfileTransport: Send + Sync {
    /// Submit the application; success yields the application id.
    async fn apply_to_job(&self, token: &str, job_id: &str) -> Result<String, TransportError>;

    async fn update_role_preferences(
        &self,
        token: &str,
        role_ids: &[String],
    ) -> Result<(), TransportError>;

    async fn update_work_location_preferences(
        &self,
        token: &str,
        place_ids: &[String],
    ) -> Result<(), TransportError>;

    async fn update_home_location(&self, token: &str, text: &str) -> Result<(), TransportError>;

    async fn upload_certification(
        &self,
        token: &str,
        file: &FileRef,
        name: &str,
        expires_at: Option<Timestamp>,
    ) -> Result<(), TransportError>;

    /// Success yields the hosted résumé URL.
    async fn upload_resume(&self, token: &str, file: &FileRef) -> Result<String, TransportError>;

    async fn current_user(&self, token: &str) -> Result<ProfileSummary, TransportError>;
}

/// Place resolution. Both calls fail soft: any transport error degrades to
/// an empty result and the UI falls back to manual entry.
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    async fn search(&self, text: &str) -> Vec<Place>;

    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<Place>;
}

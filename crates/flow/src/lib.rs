//! The wizard flow engine.
//!
//! Orchestrates per-step transitions for the two onboarding wizards over
//! narrow transport traits, keeps the persisted stores and the history
//! synchronizer in lockstep, bridges the shared auth sub-flow from the
//! apply wizard into the claim wizard, and carries the demo-mode
//! implementations of every external collaborator.

pub mod apply;
pub mod binding;
pub mod bridge;
pub mod claim;
pub mod demo;
pub mod error;
pub mod mount;
pub mod saves;
pub mod transport;

pub use apply::{ApplyCompletion, ApplyFlow};
pub use claim::{ClaimCompletion, ClaimFlow};
pub use error::{FlowError, FlowResult, FlowWarning, StepAdvance};
pub use mount::MountParams;
pub use transport::{
    AuthTransport, CertificationFile, FileRef, PlaceResolver, ProfileSummary, ProfileTransport,
    TransportError,
};

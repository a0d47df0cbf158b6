//! Browser history/URL synchronization for the wizards.
//!
//! The store's `step` is the single source of truth; this crate keeps the
//! address bar and the session history consistent with it in both
//! directions, through the narrow [`device::HistoryDevice`] seam. The
//! synchronizer is its own small state machine (have we seen the initial
//! URL, was this change history-driven) rather than history calls
//! scattered across transition call sites.

pub mod device;
pub mod location;
pub mod sync;

pub use device::{HistoryDevice, HistoryEntry, MemoryHistory};
pub use location::{AddressMode, Location};
pub use sync::{ChangeSource, Synchronizer};

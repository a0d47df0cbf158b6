//! A flow's attachment to the host's history device.

use hirelane_core::steps::WizardStep;
use hirelane_history::{AddressMode, HistoryDevice, Synchronizer};

/// Bundles the synchronizer with the device it drives. Created when the
/// host attaches a wizard to its history; absent in headless usage
/// (tests, server-side rendering).
pub struct HistoryBinding<S: WizardStep> {
    pub(crate) sync: Synchronizer<S>,
    pub(crate) device: Box<dyn HistoryDevice>,
}

impl<S: WizardStep> HistoryBinding<S> {
    pub fn new(mode: AddressMode, device: Box<dyn HistoryDevice>) -> Self {
        Self {
            sync: Synchronizer::new(mode),
            device,
        }
    }
}

//! Pass-through membrane: every signal is delivered immediately.

use super::{reject_detector, DendriticIntegrationMode};
use crate::channel::IonChannel;
use crate::coincidence::CoincidenceDetector;
use crate::types::{IntegratedPotential, MembraneSnapshot, SynapticSignal};
use std::time::Instant;
use tracing::debug;

/// No buffering, no channels, no decay.
#[derive(Debug, Default)]
pub struct PassiveMembraneMode;

impl PassiveMembraneMode {
    /// Create the mode
    pub fn new() -> Self {
        Self
    }
}

impl DendriticIntegrationMode for PassiveMembraneMode {
    fn name(&self) -> &'static str {
        "passive"
    }

    fn handle_at(&self, signal: SynapticSignal, _now: Instant) -> Option<IntegratedPotential> {
        Some(IntegratedPotential::from_net(signal.value))
    }

    fn process_at(
        &self,
        _snapshot: &MembraneSnapshot,
        _now: Instant,
    ) -> Option<IntegratedPotential> {
        None
    }

    fn set_coincidence_detector(&self, detector: Box<dyn CoincidenceDetector>) {
        reject_detector(self.name(), detector);
    }

    fn set_channels(&self, channels: Vec<Box<dyn IonChannel>>) {
        for channel in channels {
            self.add_channel(channel);
        }
    }

    fn add_channel(&self, mut channel: Box<dyn IonChannel>) {
        debug!(channel = channel.name(), "passive membrane has no channels; closing");
        channel.close();
    }

    fn pending_inputs(&self) -> usize {
        0
    }

    fn close(&self) {}
}

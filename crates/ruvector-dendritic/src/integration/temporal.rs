//! Linear temporal summation without decay.

use super::{
    finish, reject_detector, ChannelChain, ChannelContext, DendriticIntegrationMode, InputBuffer,
};
use crate::channel::{ChannelFeedback, IonChannel};
use crate::coincidence::CoincidenceDetector;
use crate::constants::RESTING_POTENTIAL;
use crate::types::{IntegratedPotential, MembraneSnapshot, SynapticSignal, TimestampedInput};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Buffers inputs and sums them unweighted at each tick.
#[derive(Debug)]
pub struct TemporalSummationMode {
    buffer: InputBuffer,
    channels: ChannelChain,
    context: ChannelContext,
    closed: AtomicBool,
}

impl Default for TemporalSummationMode {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalSummationMode {
    /// Create the mode with an empty channel chain
    pub fn new() -> Self {
        Self {
            buffer: InputBuffer::new(),
            channels: ChannelChain::new(),
            context: ChannelContext::new(RESTING_POTENTIAL),
            closed: AtomicBool::new(false),
        }
    }

    /// Names of the channels in the chain
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.names()
    }
}

impl DendriticIntegrationMode for TemporalSummationMode {
    fn name(&self) -> &'static str {
        "temporal_summation"
    }

    fn handle_at(&self, signal: SynapticSignal, now: Instant) -> Option<IntegratedPotential> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        let (voltage, calcium) = self.context.get();
        let outcome = self.channels.run(signal, voltage, calcium);
        if !outcome.proceed {
            return outcome.blocked_effect();
        }
        let mut input = TimestampedInput::new(outcome.signal, now, 1.0);
        input.channel_currents = outcome.currents;
        self.buffer.push(input);
        None
    }

    fn process_at(
        &self,
        snapshot: &MembraneSnapshot,
        _now: Instant,
    ) -> Option<IntegratedPotential> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        self.context.update(snapshot);
        let batch = self.buffer.drain();
        if batch.is_empty() {
            return None;
        }

        let mut potential = IntegratedPotential::default();
        let (mut excitation, mut inhibition) = (0.0, 0.0);
        for input in &batch {
            let mut contribution = input.signal.value;
            for current in &input.channel_currents {
                contribution += current.current;
                potential.add_ion_current(current.ion, current.current);
                potential.add_contribution(&current.channel, current.current);
            }
            if contribution > 0.0 {
                excitation += contribution;
            } else {
                inhibition -= contribution;
            }
        }
        potential.add_contribution("excitation", excitation);
        potential.add_contribution("inhibition", inhibition);

        let net = excitation - inhibition;
        trace!(inputs = batch.len(), excitation, inhibition, net, "temporal summation tick");
        finish(potential, net)
    }

    fn set_coincidence_detector(&self, detector: Box<dyn CoincidenceDetector>) {
        reject_detector(self.name(), detector);
    }

    fn set_channels(&self, channels: Vec<Box<dyn IonChannel>>) {
        self.channels.set(channels);
    }

    fn add_channel(&self, channel: Box<dyn IonChannel>) {
        self.channels.push(channel);
    }

    fn update_channel_kinetics(&self, feedback: &ChannelFeedback, dt: Duration) {
        let (voltage, _) = self.context.get();
        self.channels.update_kinetics(feedback, dt, voltage);
    }

    fn pending_inputs(&self) -> usize {
        self.buffer.len()
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.channels.close_all();
        self.buffer.clear();
        debug!(mode = self.name(), "integration mode closed");
    }
}

impl Drop for TemporalSummationMode {
    fn drop(&mut self) {
        self.close();
    }
}

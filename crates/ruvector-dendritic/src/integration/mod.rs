//! Dendritic integration strategies.
//!
//! Every neuron owns one [`DendriticIntegrationMode`]. It is driven from two
//! call sites that may run on different threads:
//!
//! - [`handle`](DendriticIntegrationMode::handle) from the message-delivery
//!   path (many concurrent senders)
//! - [`process`](DendriticIntegrationMode::process) from the neuron's
//!   periodic tick (never concurrent with itself)
//!
//! The input buffer is the only shared mutable state on the hot path.
//! `process` drains it in one atomic step and computes outside the lock.
//!
//! | Mode | Buffering | Decay | Nonlinearity |
//! |------|-----------|-------|--------------|
//! | [`PassiveMembraneMode`] | no | no | none |
//! | [`TemporalSummationMode`] | yes | no | none |
//! | [`BiologicalTemporalSummationMode`] | yes | yes | none |
//! | [`ShuntingInhibitionMode`] | yes | yes | divisive inhibition |
//! | [`ActiveDendriteMode`] | yes | yes | saturation, shunting, dendritic spikes |

mod active;
mod biological;
mod buffer;
mod chain;
mod noise;
mod passive;
mod shunting;
mod temporal;

pub use active::ActiveDendriteMode;
pub use biological::BiologicalTemporalSummationMode;
pub use buffer::InputBuffer;
pub use chain::{ChainOutcome, ChannelChain};
pub use noise::MembraneNoise;
pub use passive::PassiveMembraneMode;
pub use shunting::{shunt_factor, ShuntingInhibitionMode};
pub use temporal::TemporalSummationMode;

use crate::channel::{ChannelFeedback, IonChannel};
use crate::coincidence::CoincidenceDetector;
use crate::constants::{NOISE_FLOOR, RESTING_CALCIUM};
use crate::types::{clamp_current, IntegratedPotential, MembraneSnapshot, SynapticSignal};
use parking_lot::Mutex;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Strategy that turns synaptic signals into somatic current.
pub trait DendriticIntegrationMode: Send + Sync + fmt::Debug {
    /// Mode name (matches the serialized `ModeKind`)
    fn name(&self) -> &'static str;

    /// Accept a signal that arrived at `now`.
    ///
    /// Returns an immediate effect for pass-through modes, or when a channel
    /// vetoed the signal after producing a significant current. Buffering
    /// modes otherwise return `None`.
    fn handle_at(&self, signal: SynapticSignal, now: Instant) -> Option<IntegratedPotential>;

    /// [`handle_at`](Self::handle_at) with the current instant
    fn handle(&self, signal: SynapticSignal) -> Option<IntegratedPotential> {
        self.handle_at(signal, Instant::now())
    }

    /// Integrate and clear the buffered batch for a tick at `now`.
    ///
    /// Returns `None` when the buffer is empty or the net effect is below the
    /// noise floor.
    fn process_at(&self, snapshot: &MembraneSnapshot, now: Instant)
        -> Option<IntegratedPotential>;

    /// [`process_at`](Self::process_at) with the current instant
    fn process(&self, snapshot: &MembraneSnapshot) -> Option<IntegratedPotential> {
        self.process_at(snapshot, Instant::now())
    }

    /// Hand a detector to the mode.
    ///
    /// The mode becomes its sole owner. Modes without coincidence detection
    /// close it immediately.
    fn set_coincidence_detector(&self, detector: Box<dyn CoincidenceDetector>);

    /// Replace the channel chain, closing the previous channels
    fn set_channels(&self, channels: Vec<Box<dyn IonChannel>>);

    /// Append a channel to the end of the chain
    fn add_channel(&self, channel: Box<dyn IonChannel>);

    /// Forward use-dependent feedback to every channel in the chain
    fn update_channel_kinetics(&self, _feedback: &ChannelFeedback, _dt: Duration) {}

    /// Inputs buffered for the next tick
    fn pending_inputs(&self) -> usize;

    /// Close owned channels and detectors exactly once and drop the buffer
    fn close(&self);
}

/// Membrane voltage and calcium the channel chain runs against.
///
/// Updated from every tick's snapshot; read by `handle` on the delivery path.
#[derive(Debug)]
pub(crate) struct ChannelContext {
    inner: Mutex<(f64, f64)>,
}

impl ChannelContext {
    pub fn new(resting_potential: f64) -> Self {
        Self {
            inner: Mutex::new((resting_potential, RESTING_CALCIUM)),
        }
    }

    /// `(voltage_mv, calcium_mm)`
    pub fn get(&self) -> (f64, f64) {
        *self.inner.lock()
    }

    pub fn update(&self, snapshot: &MembraneSnapshot) {
        *self.inner.lock() = (snapshot.membrane_voltage(), snapshot.intracellular_calcium);
    }
}

/// Close a detector handed to a mode that has no use for it
pub(crate) fn reject_detector(mode: &'static str, mut detector: Box<dyn CoincidenceDetector>) {
    debug!(
        mode,
        detector = detector.name(),
        "mode has no coincidence detection; closing detector"
    );
    detector.close();
}

/// Clamp the net current and apply the noise floor
pub(crate) fn finish(mut potential: IntegratedPotential, net: f64) -> Option<IntegratedPotential> {
    let net = clamp_current(net);
    if net.abs() < NOISE_FLOOR {
        return None;
    }
    potential.net_current = net;
    Some(potential)
}

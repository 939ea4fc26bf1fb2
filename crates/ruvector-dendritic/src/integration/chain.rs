//! Ordered channel chain owned by an integration mode.

use crate::channel::{ChannelFeedback, IonChannel};
use crate::constants::NOISE_FLOOR;
use crate::types::{ChannelCurrent, IntegratedPotential, SynapticSignal};
use parking_lot::Mutex;
use std::mem;
use std::time::Duration;
use tracing::debug;

/// Result of running a signal through the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    /// The signal as the last channel left it
    pub signal: SynapticSignal,
    /// `false` when a channel vetoed the signal
    pub proceed: bool,
    /// Current of every channel that ran, in chain order
    pub currents: Vec<ChannelCurrent>,
}

impl ChainOutcome {
    /// Sum of channel currents
    pub fn total_current(&self) -> f64 {
        self.currents.iter().map(|c| c.current).sum()
    }

    /// Channel-only effect of a vetoed signal, if significant
    pub fn blocked_effect(&self) -> Option<IntegratedPotential> {
        let total = self.total_current();
        if total.abs() < NOISE_FLOOR {
            return None;
        }
        let mut potential = IntegratedPotential::from_net(total);
        for current in &self.currents {
            potential.add_ion_current(current.ion, current.current);
            potential.add_contribution(&current.channel, current.current);
        }
        Some(potential)
    }
}

/// Channels applied to every incoming signal, in order.
///
/// Calls are serialized by the chain's lock. Once closed, the chain closes
/// any channel handed to it instead of keeping it.
#[derive(Debug, Default)]
pub struct ChannelChain {
    slots: Mutex<Slots>,
}

#[derive(Debug, Default)]
struct Slots {
    channels: Vec<Box<dyn IonChannel>>,
    closed: bool,
}

impl ChannelChain {
    /// Empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `signal` through every channel until one vetoes it
    pub fn run(&self, signal: SynapticSignal, voltage: f64, calcium: f64) -> ChainOutcome {
        let mut slots = self.slots.lock();
        let mut signal = signal;
        let mut currents = Vec::with_capacity(slots.channels.len());

        for channel in slots.channels.iter_mut() {
            let modulation = channel.modulate_current(&signal, voltage, calcium);
            currents.push(ChannelCurrent {
                channel: channel.name().to_string(),
                ion: channel.ion_selectivity(),
                current: modulation.current,
            });
            if !modulation.proceed {
                debug!(
                    channel = channel.name(),
                    source = %signal.source_id,
                    value = signal.value,
                    "signal vetoed by channel"
                );
                return ChainOutcome {
                    signal,
                    proceed: false,
                    currents,
                };
            }
            if let Some(modified) = modulation.signal {
                signal = modified;
            }
        }

        ChainOutcome {
            signal,
            proceed: true,
            currents,
        }
    }

    /// Replace the chain, closing every previous channel
    pub fn set(&self, channels: Vec<Box<dyn IonChannel>>) {
        let mut slots = self.slots.lock();
        if slots.closed {
            drop(slots);
            close_each(channels);
            return;
        }
        let previous = mem::replace(&mut slots.channels, channels);
        drop(slots);
        close_each(previous);
    }

    /// Append a channel
    pub fn push(&self, channel: Box<dyn IonChannel>) {
        let mut slots = self.slots.lock();
        if slots.closed {
            drop(slots);
            close_each(vec![channel]);
            return;
        }
        slots.channels.push(channel);
    }

    /// Forward feedback to every channel
    pub fn update_kinetics(&self, feedback: &ChannelFeedback, dt: Duration, voltage: f64) {
        for channel in self.slots.lock().channels.iter_mut() {
            channel.update_kinetics(feedback, dt, voltage);
        }
    }

    /// Close and drop every channel; later channels are closed on arrival
    pub fn close_all(&self) {
        let channels = {
            let mut slots = self.slots.lock();
            slots.closed = true;
            mem::take(&mut slots.channels)
        };
        close_each(channels);
    }

    /// Number of channels
    pub fn len(&self) -> usize {
        self.slots.lock().channels.len()
    }

    /// True when the chain is empty
    pub fn is_empty(&self) -> bool {
        self.slots.lock().channels.is_empty()
    }

    /// Channel names in chain order
    pub fn names(&self) -> Vec<String> {
        self.slots
            .lock()
            .channels
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }
}

fn close_each(channels: Vec<Box<dyn IonChannel>>) {
    for mut channel in channels {
        if !channel.is_closed() {
            channel.close();
        }
    }
}

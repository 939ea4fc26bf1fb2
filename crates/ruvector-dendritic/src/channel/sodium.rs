//! Voltage-gated sodium channel (Nav) with use-dependent inactivation
//!
//! ```text
//! g_Na = g_max · m³ · h · a
//! ```
//!
//! `a` is the use-dependent availability: each firing contribution removes a
//! fixed fraction of the headroom above the floor, and it recovers toward 1.0
//! with the recovery time constant while the channel is not driving spikes.

use super::gating::{boltzmann_activation, boltzmann_inactivation, relax, Gate};
use super::{
    decide, ChannelCore, ChannelFeedback, ChannelKind, ChannelModulation, ChannelState,
    ChannelTrigger, GateSteadyState, GatingDecision, IonChannel,
};
use crate::config::ChannelConfig;
use crate::constants::CHANNEL_STEP;
use crate::types::{IonSelectivity, SynapticSignal};
use std::time::Duration;

/// Open probability at which Nav is reported open (m³h peaks well below 0.5)
const SODIUM_OPEN_THRESHOLD: f64 = 0.1;

/// Voltage-gated sodium channel
#[derive(Debug, Clone)]
pub struct SodiumChannel {
    core: ChannelCore,
    m: Gate,
    h: Gate,
    availability: f64,
    use_rate: f64,
    use_floor: f64,
    boost_gain: f64,
}

impl SodiumChannel {
    /// Create a channel with gates at steady state for `config.initial_voltage`
    pub fn new(config: &ChannelConfig) -> Self {
        let trigger = config.trigger.clone();
        let v = config.initial_voltage;
        let m = boltzmann_activation(v, trigger.activation_voltage, trigger.voltage_slope);
        let h = boltzmann_inactivation(v, trigger.inactivation_voltage, trigger.voltage_slope);

        let mut channel = Self {
            core: ChannelCore::new(
                config.name.clone(),
                trigger,
                config.max_conductance,
                config.reversal_potential,
                v,
            ),
            m: Gate::at(m),
            h: Gate::at(h),
            availability: 1.0,
            use_rate: config.modulation_rate,
            use_floor: config.modulation_bound,
            boost_gain: config.signal_gain,
        };
        channel.refresh_state(v, channel.core.state.calcium_level);
        channel
    }

    /// Use-dependent availability in `[floor, 1]`
    pub fn availability(&self) -> f64 {
        self.availability
    }

    fn open_probability(&self) -> f64 {
        self.m.value().powi(3) * self.h.value() * self.availability
    }

    fn relax_gates(&mut self, voltage: f64, dt: Duration) {
        let steady = self.steady_state(voltage);
        let t = &self.core.trigger;
        let (act, deact, inact, recov) = (
            t.activation_tau,
            t.deactivation_tau,
            t.inactivation_tau,
            t.recovery_tau,
        );

        let was_available = self.h.value() >= 0.5;
        self.m.relax_toward(steady.activation, dt, act, deact);
        self.h.relax_toward(steady.inactivation, dt, recov, inact);
        self.core
            .record_inactivation(was_available, self.h.value() >= 0.5);
    }

    fn refresh_state(&mut self, voltage: f64, calcium: f64) -> f64 {
        let p = self.open_probability();
        let g = self.core.conductance_for(p);
        self.core
            .record(g, voltage, calcium, p >= SODIUM_OPEN_THRESHOLD);
        p
    }
}

impl IonChannel for SodiumChannel {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Sodium
    }

    fn modulate_current(
        &mut self,
        signal: &SynapticSignal,
        voltage: f64,
        calcium: f64,
    ) -> ChannelModulation {
        self.relax_gates(voltage, CHANNEL_STEP);
        let p = self.refresh_state(voltage, calcium);
        let current = self.core.driving_current(self.core.state.conductance, voltage);

        if signal.is_inhibitory() {
            return ChannelModulation::unchanged(current);
        }

        // Active Nav boosts passing EPSPs
        let mut boosted = signal.clone();
        boosted.value *= 1.0 + self.boost_gain * p;
        ChannelModulation::pass(boosted, current)
    }

    fn should_open(
        &mut self,
        voltage: f64,
        _ligand_concentration: f64,
        calcium: f64,
        dt: Duration,
    ) -> GatingDecision {
        if self.core.closed {
            return decide(0.0, SODIUM_OPEN_THRESHOLD, Duration::ZERO);
        }
        self.relax_gates(voltage, dt);
        let p = self.refresh_state(voltage, calcium);
        decide(p, SODIUM_OPEN_THRESHOLD, self.core.trigger.inactivation_tau)
    }

    fn update_kinetics(&mut self, feedback: &ChannelFeedback, dt: Duration, voltage: f64) {
        self.relax_gates(voltage, dt);

        if feedback.contributed_to_firing {
            self.availability =
                self.use_floor + (self.availability - self.use_floor) * (1.0 - self.use_rate);
        } else {
            self.availability = relax(self.availability, 1.0, dt, self.core.trigger.recovery_tau);
        }

        let calcium = self.core.state.calcium_level;
        self.refresh_state(voltage, calcium);
    }

    fn steady_state(&self, voltage: f64) -> GateSteadyState {
        let t = &self.core.trigger;
        GateSteadyState {
            activation: boltzmann_activation(voltage, t.activation_voltage, t.voltage_slope),
            inactivation: boltzmann_inactivation(voltage, t.inactivation_voltage, t.voltage_slope),
        }
    }

    fn state(&self) -> ChannelState {
        self.core.state.clone()
    }

    fn trigger(&self) -> &ChannelTrigger {
        &self.core.trigger
    }

    fn conductance(&self) -> f64 {
        self.core.state.conductance
    }

    fn reversal_potential(&self) -> f64 {
        self.core.reversal_potential
    }

    fn ion_selectivity(&self) -> IonSelectivity {
        IonSelectivity::Sodium
    }

    fn close(&mut self) {
        self.core.close();
    }

    fn is_closed(&self) -> bool {
        self.core.closed
    }
}

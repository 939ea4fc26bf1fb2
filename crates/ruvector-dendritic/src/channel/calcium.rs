//! High-voltage-activated calcium channel (Cav) with facilitation
//!
//! ```text
//! g_Ca = g_max · m² · f · cdi
//! cdi  = 1 / (1 + [Ca]ᵢ / K_cdi)
//! ```
//!
//! `f` is calcium-driven facilitation: every feedback carrying calcium influx
//! closes a fraction of the gap between `f` and 1.0, so repeated influx
//! strictly raises conductance without ever exceeding `g_max`.

use super::gating::{boltzmann_activation, relax, Gate};
use super::{
    decide, ChannelCore, ChannelFeedback, ChannelKind, ChannelModulation, ChannelState,
    ChannelTrigger, GateSteadyState, GatingDecision, IonChannel,
};
use crate::config::ChannelConfig;
use crate::constants::{
    CALCIUM_CDI_HALF, CHANNEL_STEP, MAX_MODULATION_STEP, OPEN_PROBABILITY_THRESHOLD,
};
use crate::types::{IonSelectivity, SynapticSignal};
use std::time::Duration;

/// High-voltage-activated calcium channel
#[derive(Debug, Clone)]
pub struct CalciumChannel {
    core: ChannelCore,
    m: Gate,
    facilitation: f64,
    facilitation_rate: f64,
    facilitation_baseline: f64,
    boost_gain: f64,
}

impl CalciumChannel {
    /// Create a channel with `m` at steady state for `config.initial_voltage`
    pub fn new(config: &ChannelConfig) -> Self {
        let trigger = config.trigger.clone();
        let v = config.initial_voltage;
        let m = boltzmann_activation(v, trigger.activation_voltage, trigger.voltage_slope);

        let mut channel = Self {
            core: ChannelCore::new(
                config.name.clone(),
                trigger,
                config.max_conductance,
                config.reversal_potential,
                v,
            ),
            m: Gate::at(m),
            facilitation: config.modulation_bound,
            facilitation_rate: config.modulation_rate,
            facilitation_baseline: config.modulation_bound,
            boost_gain: config.signal_gain,
        };
        channel.refresh_state(v, channel.core.state.calcium_level);
        channel
    }

    /// Facilitation factor in `[baseline, 1]`
    pub fn facilitation(&self) -> f64 {
        self.facilitation
    }

    fn calcium_dependent_inactivation(calcium: f64) -> f64 {
        1.0 / (1.0 + calcium.max(0.0) / CALCIUM_CDI_HALF)
    }

    fn open_probability(&self, calcium: f64) -> f64 {
        self.m.value().powi(2) * self.facilitation * Self::calcium_dependent_inactivation(calcium)
    }

    fn relax_gates(&mut self, voltage: f64, dt: Duration) {
        let steady = self.steady_state(voltage).activation;
        let t = &self.core.trigger;
        let (act, deact) = (t.activation_tau, t.deactivation_tau);
        self.m.relax_toward(steady, dt, act, deact);
    }

    fn refresh_state(&mut self, voltage: f64, calcium: f64) -> f64 {
        let p = self.open_probability(calcium);
        let g = self.core.conductance_for(p);
        self.core
            .record(g, voltage, calcium, p >= OPEN_PROBABILITY_THRESHOLD);
        p
    }
}

impl IonChannel for CalciumChannel {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Calcium
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
            return decide(0.0, OPEN_PROBABILITY_THRESHOLD, Duration::ZERO);
        }
        self.relax_gates(voltage, dt);
        let p = self.refresh_state(voltage, calcium);
        decide(
            p,
            OPEN_PROBABILITY_THRESHOLD,
            self.core.trigger.deactivation_tau,
        )
    }

    fn update_kinetics(&mut self, feedback: &ChannelFeedback, dt: Duration, voltage: f64) {
        self.relax_gates(voltage, dt);

        if feedback.calcium_influx > 0.0 {
            let drive = feedback.calcium_influx.min(1.0)
                * (1.0 + feedback.camkii_activity.clamp(0.0, 1.0));
            let step = (self.facilitation_rate * drive).min(MAX_MODULATION_STEP);
            self.facilitation = 1.0 - (1.0 - self.facilitation) * (1.0 - step);
        } else {
            self.facilitation = relax(
                self.facilitation,
                self.facilitation_baseline,
                dt,
                self.core.trigger.recovery_tau,
            );
        }

        let calcium = self.core.state.calcium_level;
        self.refresh_state(voltage, calcium);
    }

    fn steady_state(&self, voltage: f64) -> GateSteadyState {
        let t = &self.core.trigger;
        GateSteadyState {
            activation: boltzmann_activation(voltage, t.activation_voltage, t.voltage_slope),
            inactivation: 1.0,
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
        IonSelectivity::Calcium
    }

    fn close(&mut self) {
        self.core.close();
    }

    fn is_closed(&self) -> bool {
        self.core.closed
    }
}

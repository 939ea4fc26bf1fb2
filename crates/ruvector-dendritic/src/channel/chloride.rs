//! GABA-A ligand-gated chloride channel
//!
//! Gating depends on transmitter concentration only:
//!
//! ```text
//! a∞ = Lⁿ / (EC50ⁿ + Lⁿ)                 activation, τ ≈ 2ms
//! d∞ = 1 − D_max · a∞                     desensitization, τ ≈ 100ms
//! g_Cl = g_max · a · d
//! ```
//!
//! With `E_Cl` near rest the current is small but the conductance divides
//! excitatory drive. Once the open fraction passes the shunt-block fraction,
//! excitatory signals are vetoed outright.

use super::gating::{hill, Gate};
use super::{
    decide, ChannelCore, ChannelFeedback, ChannelKind, ChannelModulation, ChannelState,
    ChannelTrigger, GateSteadyState, GatingDecision, IonChannel,
};
use crate::config::ChannelConfig;
use crate::constants::{
    CHANNEL_STEP, GABA_MAX_DESENSITIZATION, GABA_SHUNT_BLOCK_FRACTION, OPEN_PROBABILITY_THRESHOLD,
};
use crate::types::{IonSelectivity, SynapticSignal};
use std::time::Duration;
use tracing::trace;

/// GABA-A receptor channel
#[derive(Debug, Clone)]
pub struct LigandGatedChlorideChannel {
    core: ChannelCore,
    activation: Gate,
    desensitization: Gate,
    ligand: f64,
    boost_gain: f64,
}

impl LigandGatedChlorideChannel {
    /// Create a channel with no transmitter bound
    pub fn new(config: &ChannelConfig) -> Self {
        let mut channel = Self {
            core: ChannelCore::new(
                config.name.clone(),
                config.trigger.clone(),
                config.max_conductance,
                config.reversal_potential,
                config.initial_voltage,
            ),
            activation: Gate::at(0.0),
            desensitization: Gate::at(1.0),
            ligand: 0.0,
            boost_gain: config.signal_gain,
        };
        channel.refresh_state(config.initial_voltage, channel.core.state.calcium_level);
        channel
    }

    /// Fraction of receptors not desensitized
    pub fn availability(&self) -> f64 {
        self.desensitization.value()
    }

    /// Ligand concentration seen at the last update
    pub fn ligand(&self) -> f64 {
        self.ligand
    }

    fn bound_fraction(&self, ligand: f64) -> f64 {
        let t = &self.core.trigger;
        hill(ligand, t.ligand_threshold, t.hill_coefficient)
    }

    fn open_probability(&self) -> f64 {
        self.activation.value() * self.desensitization.value()
    }

    fn relax_gates(&mut self, ligand: f64, dt: Duration) {
        self.ligand = ligand.max(0.0);
        let bound = self.bound_fraction(self.ligand);
        let t = &self.core.trigger;
        let (act, deact, desens, recov) = (
            t.activation_tau,
            t.deactivation_tau,
            t.inactivation_tau,
            t.recovery_tau,
        );

        let was_available = self.desensitization.value() >= 0.5;
        self.activation.relax_toward(bound, dt, act, deact);
        self.desensitization
            .relax_toward(1.0 - GABA_MAX_DESENSITIZATION * bound, dt, recov, desens);
        self.core
            .record_inactivation(was_available, self.desensitization.value() >= 0.5);
    }

    fn refresh_state(&mut self, voltage: f64, calcium: f64) -> f64 {
        let p = self.open_probability();
        let g = self.core.conductance_for(p);
        self.core
            .record(g, voltage, calcium, p >= OPEN_PROBABILITY_THRESHOLD);
        p
    }
}

impl IonChannel for LigandGatedChlorideChannel {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Chloride
    }

    fn modulate_current(
        &mut self,
        signal: &SynapticSignal,
        voltage: f64,
        calcium: f64,
    ) -> ChannelModulation {
        let ligand = if signal.is_inhibitory() {
            signal.value.abs()
        } else {
            0.0
        };
        self.relax_gates(ligand, CHANNEL_STEP);
        let p = self.refresh_state(voltage, calcium);
        let current = self.core.driving_current(self.core.state.conductance, voltage);

        if signal.is_inhibitory() {
            let mut enhanced = signal.clone();
            enhanced.value *= 1.0 + self.boost_gain * p;
            return ChannelModulation::pass(enhanced, current);
        }

        if p >= GABA_SHUNT_BLOCK_FRACTION {
            trace!(channel = %self.core.name, open = p, "chloride shunt vetoed EPSP");
            return ChannelModulation::block(current);
        }

        let mut shunted = signal.clone();
        shunted.value *= 1.0 - p;
        ChannelModulation::pass(shunted, current)
    }

    fn should_open(
        &mut self,
        voltage: f64,
        ligand_concentration: f64,
        calcium: f64,
        dt: Duration,
    ) -> GatingDecision {
        if self.core.closed {
            return decide(0.0, OPEN_PROBABILITY_THRESHOLD, Duration::ZERO);
        }
        self.relax_gates(ligand_concentration, dt);
        let p = self.refresh_state(voltage, calcium);
        decide(
            p,
            OPEN_PROBABILITY_THRESHOLD,
            self.core.trigger.deactivation_tau,
        )
    }

    fn update_kinetics(&mut self, _feedback: &ChannelFeedback, dt: Duration, voltage: f64) {
        // Transmitter is cleared from the cleft between events
        self.relax_gates(0.0, dt);
        let calcium = self.core.state.calcium_level;
        self.refresh_state(voltage, calcium);
    }

    fn steady_state(&self, _voltage: f64) -> GateSteadyState {
        let bound = self.bound_fraction(self.ligand);
        GateSteadyState {
            activation: bound,
            inactivation: 1.0 - GABA_MAX_DESENSITIZATION * bound,
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
        IonSelectivity::Chloride
    }

    fn close(&mut self) {
        self.core.close();
    }

    fn is_closed(&self) -> bool {
        self.core.closed
    }
}

//! Delayed-rectifier potassium channel (Kv)
//!
//! ```text
//! g_K = g_max · n⁴ · a
//! ```
//!
//! `a` models spike-frequency adaptation: it starts at a baseline, climbs
//! toward 1.0 with every firing contribution and relaxes back afterwards.

use super::gating::{boltzmann_activation, relax, Gate};
use super::{
    decide, ChannelCore, ChannelFeedback, ChannelKind, ChannelModulation, ChannelState,
    ChannelTrigger, GateSteadyState, GatingDecision, IonChannel,
};
use crate::config::ChannelConfig;
use crate::constants::{CHANNEL_STEP, MAX_MODULATION_STEP, OPEN_PROBABILITY_THRESHOLD};
use crate::types::{IonSelectivity, SynapticSignal};
use std::time::Duration;

/// Delayed-rectifier potassium channel
#[derive(Debug, Clone)]
pub struct PotassiumChannel {
    core: ChannelCore,
    n: Gate,
    adaptation: f64,
    adaptation_rate: f64,
    adaptation_baseline: f64,
    attenuation_gain: f64,
}

impl PotassiumChannel {
    /// Create a channel with `n` at steady state for `config.initial_voltage`
    pub fn new(config: &ChannelConfig) -> Self {
        let trigger = config.trigger.clone();
        let v = config.initial_voltage;
        let n = boltzmann_activation(v, trigger.activation_voltage, trigger.voltage_slope);

        let mut channel = Self {
            core: ChannelCore::new(
                config.name.clone(),
                trigger,
                config.max_conductance,
                config.reversal_potential,
                v,
            ),
            n: Gate::at(n),
            adaptation: config.modulation_bound,
            adaptation_rate: config.modulation_rate,
            adaptation_baseline: config.modulation_bound,
            attenuation_gain: config.signal_gain,
        };
        channel.refresh_state(v, channel.core.state.calcium_level);
        channel
    }

    /// Spike-frequency adaptation factor in `[baseline, 1]`
    pub fn adaptation(&self) -> f64 {
        self.adaptation
    }

    fn open_probability(&self) -> f64 {
        self.n.value().powi(4) * self.adaptation
    }

    fn relax_gates(&mut self, voltage: f64, dt: Duration) {
        let steady = self.steady_state(voltage).activation;
        let t = &self.core.trigger;
        let (act, deact) = (t.activation_tau, t.deactivation_tau);
        self.n.relax_toward(steady, dt, act, deact);
    }

    fn refresh_state(&mut self, voltage: f64, calcium: f64) -> f64 {
        let p = self.open_probability();
        let g = self.core.conductance_for(p);
        self.core
            .record(g, voltage, calcium, p >= OPEN_PROBABILITY_THRESHOLD);
        p
    }
}

impl IonChannel for PotassiumChannel {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Potassium
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

        // Open Kv shunts part of each EPSP but never inverts it
        let mut attenuated = signal.clone();
        attenuated.value *= (1.0 - self.attenuation_gain * p).max(0.0);
        ChannelModulation::pass(attenuated, current)
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

        if feedback.contributed_to_firing {
            let step = (self.adaptation_rate * (1.0 + feedback.pkc_activity.clamp(0.0, 1.0)))
                .min(MAX_MODULATION_STEP);
            self.adaptation = 1.0 - (1.0 - self.adaptation) * (1.0 - step);
        } else {
            self.adaptation = relax(
                self.adaptation,
                self.adaptation_baseline,
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
        IonSelectivity::Potassium
    }

    fn close(&mut self) {
        self.core.close();
    }

    fn is_closed(&self) -> bool {
        self.core.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RESTING_POTENTIAL;

    fn channel() -> PotassiumChannel {
        PotassiumChannel::new(&ChannelConfig::potassium())
    }

    #[test]
    fn test_outward_current_when_depolarized() {
        let mut kv = channel();
        let signal = SynapticSignal::new("basal", 1.0);
        let result = kv.modulate_current(&signal, -20.0, 0.0);
        assert!(result.proceed);
        assert!(result.current < 0.0);
        let attenuated = result.signal.expect("excitatory signal is replaced");
        assert!(attenuated.value < 1.0);
        assert!(attenuated.value > 0.0);
    }

    #[test]
    fn test_high_gain_never_inverts_epsp() {
        let mut kv = PotassiumChannel::new(&ChannelConfig {
            signal_gain: 3.0,
            ..ChannelConfig::potassium()
        });
        kv.should_open(20.0, 0.0, 0.0, Duration::from_millis(50));

        let result = kv.modulate_current(&SynapticSignal::new("proximal", 1.0), 20.0, 0.0);
        let attenuated = result.signal.expect("excitatory signal is replaced");
        assert!(attenuated.value >= 0.0, "EPSP became {}", attenuated.value);
        assert!(attenuated.value < 1.0);
    }

    #[test]
    fn test_opens_with_strong_depolarization() {
        let mut kv = channel();
        let decision = kv.should_open(40.0, 0.0, 0.0, Duration::from_millis(50));
        assert!(decision.open, "p = {}", decision.probability);
        assert_eq!(
            decision.expected_open_duration,
            kv.trigger().deactivation_tau
        );
    }

    #[test]
    fn test_adaptation_bounded() {
        let mut kv = channel();
        let baseline = kv.adaptation();
        let feedback = ChannelFeedback {
            contributed_to_firing: true,
            pkc_activity: 1.0,
            ..ChannelFeedback::default()
        };
        let mut last = baseline;
        for _ in 0..20 {
            kv.update_kinetics(&feedback, Duration::from_millis(1), RESTING_POTENTIAL);
            assert!(kv.adaptation() > last);
            last = kv.adaptation();
        }
        assert!(kv.adaptation() <= 1.0);

        kv.update_kinetics(
            &ChannelFeedback::default(),
            Duration::from_secs(10),
            RESTING_POTENTIAL,
        );
        assert!((kv.adaptation() - baseline).abs() < 1e-3);
    }

    #[test]
    fn test_no_inactivation_gate() {
        let kv = channel();
        assert_eq!(kv.steady_state(-100.0).inactivation, 1.0);
        assert_eq!(kv.steady_state(50.0).inactivation, 1.0);
    }
}

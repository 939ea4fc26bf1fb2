//! Temporal summation with exponential membrane decay
//!
//! Each buffered input contributes
//!
//! ```text
//! c = value · w_spatial · e^(−age/τ_branch) + Σ I_channel · e^(−age/τ_branch) + noise
//! ```
//!
//! Positive contributions sum into excitation, negative ones into inhibition.
//!
//! Ages are measured from the tick instant, except when the tick runs within
//! 5ms of the newest buffered arrival: ages are then measured from that
//! arrival, so a tick scheduled right after delivery does not age the batch
//! by its own processing delay.
//!
//! This mode is the decay engine that [`ShuntingInhibitionMode`] and
//! [`ActiveDendriteMode`] embed.
//!
//! [`ShuntingInhibitionMode`]: super::ShuntingInhibitionMode
//! [`ActiveDendriteMode`]: super::ActiveDendriteMode

use super::{
    finish, reject_detector, ChannelChain, ChannelContext, DendriticIntegrationMode, InputBuffer,
    MembraneNoise,
};
use crate::channel::{ChannelFeedback, IonChannel};
use crate::coincidence::CoincidenceDetector;
use crate::config::BiologicalConfig;
use crate::constants::{DECAY_CUTOFF_TIME_CONSTANTS, PROCESSING_JITTER_WINDOW};
use crate::types::{IntegratedPotential, MembraneSnapshot, SynapticSignal, TimestampedInput};
use crate::Result;
use rand_distr::{Distribution, Normal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Excitation/inhibition split of one decayed batch.
#[derive(Debug, Clone, Default)]
pub(crate) struct DecayedComponents {
    pub excitation: f64,
    pub inhibition: f64,
    pub noise: f64,
    /// Decayed ion currents and per-channel contributions
    pub breakdown: IntegratedPotential,
}

impl DecayedComponents {
    /// Breakdown with the excitation, inhibition and noise entries filled in
    pub fn into_potential(self) -> IntegratedPotential {
        let mut potential = self.breakdown;
        potential.add_contribution("excitation", self.excitation);
        potential.add_contribution("inhibition", self.inhibition);
        potential.add_contribution("noise", self.noise);
        potential
    }
}

/// Leaky temporal summation with spatial weighting, branch time constants
/// and deterministic membrane noise.
#[derive(Debug)]
pub struct BiologicalTemporalSummationMode {
    config: BiologicalConfig,
    buffer: InputBuffer,
    channels: ChannelChain,
    context: ChannelContext,
    noise: MembraneNoise,
    jitter: Option<Normal<f64>>,
    created_at: Instant,
    closed: AtomicBool,
}

impl BiologicalTemporalSummationMode {
    /// Create a mode after validating `config`
    pub fn new(config: BiologicalConfig) -> Result<Self> {
        config.validate()?;
        let jitter = if config.temporal_jitter.is_zero() {
            None
        } else {
            Normal::new(0.0, config.temporal_jitter.as_secs_f64()).ok()
        };
        Ok(Self {
            buffer: InputBuffer::new(),
            channels: ChannelChain::new(),
            context: ChannelContext::new(config.resting_potential),
            noise: MembraneNoise::new(config.membrane_noise),
            jitter,
            created_at: Instant::now(),
            closed: AtomicBool::new(false),
            config,
        })
    }

    /// Parameters
    pub fn config(&self) -> &BiologicalConfig {
        &self.config
    }

    /// Origin of the noise model's arrival-time axis
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Pin the noise seed (reduced modulo 2³¹)
    pub fn set_noise_seed(&self, seed: u64) {
        self.noise.reseed(seed);
    }

    /// Current noise seed
    pub fn noise_seed(&self) -> u64 {
        self.noise.seed()
    }

    /// Names of the channels in the chain
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.names()
    }

    /// Location weight scaled by the spatial decay factor, within `[0, 1]`
    pub fn spatial_weight(&self, signal: &SynapticSignal) -> f64 {
        (signal.location().weight() * self.config.spatial_decay_factor).clamp(0.0, 1.0)
    }

    /// Branch time constant by source id, then by location name, else the
    /// membrane time constant
    pub fn effective_time_constant(&self, signal: &SynapticSignal) -> Duration {
        let branches = &self.config.branch_time_constants;
        branches
            .get(&signal.source_id)
            .or_else(|| branches.get(signal.location().name()))
            .copied()
            .unwrap_or(self.config.membrane_time_constant)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Run the channel chain and buffer the surviving signal
    pub(crate) fn accept(&self, signal: SynapticSignal, now: Instant) -> Option<IntegratedPotential> {
        if self.is_closed() {
            return None;
        }
        let (voltage, calcium) = self.context.get();
        let outcome = self.channels.run(signal, voltage, calcium);
        if !outcome.proceed {
            return outcome.blocked_effect();
        }

        let weight = self.spatial_weight(&outcome.signal);
        let mut input = TimestampedInput::new(outcome.signal, self.jittered(now), weight);
        input.channel_currents = outcome.currents;
        self.buffer.push(input);
        None
    }

    /// Record the tick's membrane context and take the whole batch
    pub(crate) fn begin_tick(&self, snapshot: &MembraneSnapshot) -> Vec<TimestampedInput> {
        if self.is_closed() {
            return Vec::new();
        }
        self.context.update(snapshot);
        self.buffer.drain()
    }

    /// Decay a drained batch to `now`.
    ///
    /// With `max_effect`, each input's raw value and total contribution are
    /// clamped to `±max_effect` before summation.
    pub(crate) fn decayed_components(
        &self,
        batch: &[TimestampedInput],
        now: Instant,
        max_effect: Option<f64>,
    ) -> DecayedComponents {
        let mut components = DecayedComponents::default();
        let Some(reference) = batch.iter().map(|input| input.arrival).max() else {
            return components;
        };
        let from_reference = now.saturating_duration_since(reference) < PROCESSING_JITTER_WINDOW;

        for input in batch {
            let age = if from_reference {
                reference.saturating_duration_since(input.arrival)
            } else {
                now.saturating_duration_since(input.arrival)
            };
            let tau = self.effective_time_constant(&input.signal);
            let expired = tau
                .checked_mul(DECAY_CUTOFF_TIME_CONSTANTS)
                .is_some_and(|cutoff| age >= cutoff);
            if expired {
                continue;
            }
            let decay = (-age.as_secs_f64() / tau.as_secs_f64()).exp();

            let mut value = input.signal.value;
            if let Some(limit) = max_effect {
                value = value.clamp(-limit, limit);
            }
            let mut contribution = value * input.spatial_weight * decay;

            for current in &input.channel_currents {
                let decayed = current.current * decay;
                contribution += decayed;
                components.breakdown.add_ion_current(current.ion, decayed);
                components
                    .breakdown
                    .add_contribution(&current.channel, decayed);
            }

            let arrival_nanos = input
                .arrival
                .saturating_duration_since(self.created_at)
                .as_nanos() as f64;
            let noise = self.noise.sample(arrival_nanos);
            components.noise += noise;
            contribution += noise;

            if let Some(limit) = max_effect {
                contribution = contribution.clamp(-limit, limit);
            }
            if contribution > 0.0 {
                components.excitation += contribution;
            } else {
                components.inhibition -= contribution;
            }
        }
        components
    }

    /// Close channels and drop the buffer; true only for the first call
    pub(crate) fn close_resources(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.channels.close_all();
        self.buffer.clear();
        true
    }

    fn jittered(&self, now: Instant) -> Instant {
        let Some(normal) = &self.jitter else {
            return now;
        };
        let offset: f64 = normal.sample(&mut rand::thread_rng());
        let shift = Duration::try_from_secs_f64(offset.abs()).unwrap_or(Duration::ZERO);
        if offset >= 0.0 {
            now + shift
        } else {
            now.checked_sub(shift).unwrap_or(now)
        }
    }
}

impl DendriticIntegrationMode for BiologicalTemporalSummationMode {
    fn name(&self) -> &'static str {
        "biological_temporal_summation"
    }

    fn handle_at(&self, signal: SynapticSignal, now: Instant) -> Option<IntegratedPotential> {
        self.accept(signal, now)
    }

    fn process_at(
        &self,
        snapshot: &MembraneSnapshot,
        now: Instant,
    ) -> Option<IntegratedPotential> {
        let batch = self.begin_tick(snapshot);
        if batch.is_empty() {
            return None;
        }

        let components = self.decayed_components(&batch, now, None);
        let net = components.excitation - components.inhibition;
        trace!(
            inputs = batch.len(),
            excitation = components.excitation,
            inhibition = components.inhibition,
            net,
            "biological tick"
        );
        finish(components.into_potential(), net)
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
        if self.close_resources() {
            debug!(mode = self.name(), "integration mode closed");
        }
    }
}

impl Drop for BiologicalTemporalSummationMode {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelConfig;
    use crate::types::Neurotransmitter;
    use approx::assert_abs_diff_eq;

    fn quiet_mode() -> BiologicalTemporalSummationMode {
        BiologicalTemporalSummationMode::new(BiologicalConfig::default().without_noise()).unwrap()
    }

    #[test]
    fn test_spatial_weights() {
        let mode = quiet_mode();
        assert_eq!(mode.spatial_weight(&SynapticSignal::new("proximal_3", 1.0)), 1.0);
        assert_eq!(mode.spatial_weight(&SynapticSignal::new("BASAL", 1.0)), 0.8);
        assert_eq!(mode.spatial_weight(&SynapticSignal::new("distal", 1.0)), 0.5);
        assert_eq!(mode.spatial_weight(&SynapticSignal::new("n42", 1.0)), 0.7);
    }

    #[test]
    fn test_spatial_weight_clamped() {
        let config = BiologicalConfig {
            spatial_decay_factor: 2.0,
            ..BiologicalConfig::default().without_noise()
        };
        let mode = BiologicalTemporalSummationMode::new(config).unwrap();
        assert_eq!(mode.spatial_weight(&SynapticSignal::new("proximal", 1.0)), 1.0);
        assert_eq!(mode.spatial_weight(&SynapticSignal::new("distal", 1.0)), 1.0);
    }

    #[test]
    fn test_branch_time_constant_lookup() {
        let config = BiologicalConfig::default()
            .without_noise()
            .with_branch_time_constant("distal", Duration::from_millis(30))
            .with_branch_time_constant("distal_7", Duration::from_millis(40));
        let mode = BiologicalTemporalSummationMode::new(config).unwrap();

        let exact = SynapticSignal::new("distal_7", 1.0);
        let by_location = SynapticSignal::new("distal_2", 1.0);
        let default = SynapticSignal::new("proximal", 1.0);
        assert_eq!(mode.effective_time_constant(&exact), Duration::from_millis(40));
        assert_eq!(mode.effective_time_constant(&by_location), Duration::from_millis(30));
        assert_eq!(mode.effective_time_constant(&default), Duration::from_millis(20));
    }

    #[test]
    fn test_tick_soon_after_arrival_measures_from_newest_input() {
        let mode = quiet_mode();
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 1.0), t0);

        // 3ms < 5ms: age is taken from the newest arrival, i.e. zero
        let result = mode
            .process_at(&MembraneSnapshot::default(), t0 + Duration::from_millis(3))
            .unwrap();
        assert_abs_diff_eq!(result.net_current, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_older_inputs_decay_relative_to_newest() {
        let mode = quiet_mode();
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 1.0), t0);
        mode.handle_at(
            SynapticSignal::new("proximal", 1.0),
            t0 + Duration::from_millis(20),
        );

        let result = mode
            .process_at(&MembraneSnapshot::default(), t0 + Duration::from_millis(21))
            .unwrap();
        assert_abs_diff_eq!(result.net_current, 1.0 + (-1.0f64).exp(), epsilon = 1e-9);
        assert_eq!(mode.pending_inputs(), 0);
    }

    #[test]
    fn test_huge_time_constant_does_not_overflow_cutoff() {
        let config = BiologicalConfig::default()
            .without_noise()
            .with_membrane_time_constant(Duration::from_secs(u64::MAX / 4));
        let mode = BiologicalTemporalSummationMode::new(config).unwrap();
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 1.0), t0);

        let result = mode
            .process_at(&MembraneSnapshot::default(), t0 + Duration::from_millis(50))
            .unwrap();
        assert_abs_diff_eq!(result.net_current, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inhibition_reported_positive() {
        let mode = quiet_mode();
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 0.5), t0);
        mode.handle_at(SynapticSignal::new("proximal", -1.5), t0);

        let result = mode.process_at(&MembraneSnapshot::default(), t0).unwrap();
        assert_abs_diff_eq!(result.net_current, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.contribution("excitation"), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(result.contribution("inhibition"), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_vetoed_signal_not_buffered() {
        let mode = quiet_mode();
        mode.set_channels(vec![ChannelConfig::chloride().build().unwrap()]);
        let snapshot = MembraneSnapshot {
            accumulator: 1.0,
            ..MembraneSnapshot::default()
        };
        // Runs the chain at -60 mV from here on
        assert!(mode.process(&snapshot).is_none());

        let ipsp =
            SynapticSignal::new("proximal", -2.0).with_neurotransmitter(Neurotransmitter::Gaba);
        for _ in 0..5 {
            assert!(mode.handle(ipsp.clone()).is_none());
        }
        assert_eq!(mode.pending_inputs(), 5);

        let effect = mode.handle(SynapticSignal::new("proximal", 1.0));
        assert_eq!(mode.pending_inputs(), 5);
        let effect = effect.expect("open chloride channel carries current");
        assert!(effect.net_current < 0.0);
        assert!(effect.chloride_current < 0.0);
        assert_eq!(effect.contribution("gaba_a"), effect.net_current);
    }

    #[test]
    fn test_channel_currents_decay_with_input() {
        let mode = quiet_mode();
        mode.set_channels(vec![ChannelConfig::sodium().build().unwrap()]);
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 1.0), t0);

        let result = mode.process_at(&MembraneSnapshot::default(), t0).unwrap();
        assert!(result.channel_contributions.contains_key("nav"));
        assert_abs_diff_eq!(
            result.sodium_current,
            result.contribution("nav"),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_close_is_idempotent() {
        let mode = quiet_mode();
        mode.handle(SynapticSignal::new("basal", 1.0));
        mode.close();
        mode.close();
        assert_eq!(mode.pending_inputs(), 0);
        assert!(mode.handle(SynapticSignal::new("basal", 1.0)).is_none());
        assert!(mode.process(&MembraneSnapshot::default()).is_none());
    }
}

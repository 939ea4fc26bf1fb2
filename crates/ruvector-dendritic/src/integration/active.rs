//! Active dendrites: saturation, shunting and dendritic spikes
//!
//! Per tick:
//!
//! 1. drain the batch and decay it, clamping each input to
//!    `±max_synaptic_effect`
//! 2. apply divisive inhibition
//! 3. either ask the coincidence detector about the drained batch, or, with no
//!    detector, apply the fixed NMDA-spike rule:
//!    `net ≥ spike_threshold && accumulator > voltage_threshold`
//!
//! The detector path and the fallback rule never both fire in one tick.

use super::{finish, shunt_factor, BiologicalTemporalSummationMode, DendriticIntegrationMode};
use crate::channel::{ChannelFeedback, IonChannel};
use crate::coincidence::CoincidenceDetector;
use crate::config::{ActiveDendriteConfig, BiologicalConfig, ShuntingConfig};
use crate::types::{IntegratedPotential, MembraneSnapshot, SynapticSignal};
use crate::Result;
use parking_lot::Mutex;
use std::mem;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct DetectorSlot {
    detector: Option<Box<dyn CoincidenceDetector>>,
    closed: bool,
}

/// Biological decay with per-input saturation, shunting inhibition and
/// NMDA-like dendritic spikes.
#[derive(Debug)]
pub struct ActiveDendriteMode {
    base: BiologicalTemporalSummationMode,
    config: ActiveDendriteConfig,
    shunting: ShuntingConfig,
    detector: Mutex<DetectorSlot>,
}

impl ActiveDendriteMode {
    /// Create a mode after validating both configs; builds the configured
    /// detector, if any
    pub fn new(biological: BiologicalConfig, config: ActiveDendriteConfig) -> Result<Self> {
        config.validate()?;
        let base = BiologicalTemporalSummationMode::new(biological)?;
        // Built last: an error never drops an unclosed detector
        let detector = match &config.coincidence_detector {
            Some(detector) => Some(detector.build()?),
            None => None,
        };
        Ok(Self {
            base,
            shunting: config.shunting(),
            config,
            detector: Mutex::new(DetectorSlot {
                detector,
                closed: false,
            }),
        })
    }

    /// Embedded decay engine
    pub fn base(&self) -> &BiologicalTemporalSummationMode {
        &self.base
    }

    /// Parameters
    pub fn config(&self) -> &ActiveDendriteConfig {
        &self.config
    }

    /// Pin the noise seed
    pub fn set_noise_seed(&self, seed: u64) {
        self.base.set_noise_seed(seed);
    }

    /// True when a detector is installed
    pub fn has_coincidence_detector(&self) -> bool {
        self.detector.lock().detector.is_some()
    }
}

impl DendriticIntegrationMode for ActiveDendriteMode {
    fn name(&self) -> &'static str {
        "active_dendrite"
    }

    fn handle_at(&self, signal: SynapticSignal, now: Instant) -> Option<IntegratedPotential> {
        self.base.accept(signal, now)
    }

    fn process_at(
        &self,
        snapshot: &MembraneSnapshot,
        now: Instant,
    ) -> Option<IntegratedPotential> {
        let batch = self.base.begin_tick(snapshot);
        if batch.is_empty() {
            return None;
        }

        let components = self
            .base
            .decayed_components(&batch, now, Some(self.config.max_synaptic_effect));
        let shunt = shunt_factor(components.inhibition, &self.shunting);
        let mut net = components.excitation * shunt;
        trace!(
            inputs = batch.len(),
            excitation = components.excitation,
            inhibition = components.inhibition,
            shunt,
            net,
            "active dendrite tick"
        );

        let mut potential = components.into_potential();
        potential.add_contribution("shunt_factor", shunt);

        // The detector sees exactly the batch that was summed
        let detection = {
            let mut slot = self.detector.lock();
            slot.detector
                .as_mut()
                .map(|detector| (detector.name().to_string(), detector.detect(&batch, snapshot)))
        };

        match detection {
            Some((detector, result)) => {
                if result.detected {
                    net = net * result.amplification_factor + result.additional_current;
                    potential.calcium_current += result.calcium_influx;
                    potential.dendritic_spike = true;
                    potential.nonlinear_amplification = result.amplification_factor;
                    potential.add_contribution("coincidence_current", result.additional_current);
                    debug!(
                        detector = %detector,
                        amplification = result.amplification_factor,
                        additional_current = result.additional_current,
                        calcium = result.calcium_influx,
                        net,
                        "dendritic spike from coincidence"
                    );
                }
            }
            None => {
                if net >= self.config.dendritic_spike_threshold
                    && snapshot.accumulator > self.config.voltage_threshold
                {
                    net += self.config.nmda_spike_amplitude;
                    potential.calcium_current += self.config.calcium_spike_boost;
                    potential.dendritic_spike = true;
                    potential.add_contribution("nmda_spike", self.config.nmda_spike_amplitude);
                    debug!(
                        net,
                        accumulator = snapshot.accumulator,
                        "dendritic spike from threshold rule"
                    );
                }
            }
        }

        finish(potential, net)
    }

    fn set_coincidence_detector(&self, detector: Box<dyn CoincidenceDetector>) {
        let mut slot = self.detector.lock();
        if slot.closed {
            drop(slot);
            let mut detector = detector;
            debug!(detector = detector.name(), "mode closed; closing coincidence detector");
            detector.close();
            return;
        }
        debug!(detector = detector.name(), "coincidence detector installed");
        let previous = slot.detector.replace(detector);
        drop(slot);
        close_displaced(previous);
    }

    fn set_channels(&self, channels: Vec<Box<dyn IonChannel>>) {
        self.base.set_channels(channels);
    }

    fn add_channel(&self, channel: Box<dyn IonChannel>) {
        self.base.add_channel(channel);
    }

    fn update_channel_kinetics(&self, feedback: &ChannelFeedback, dt: Duration) {
        self.base.update_channel_kinetics(feedback, dt);
    }

    fn pending_inputs(&self) -> usize {
        self.base.pending_inputs()
    }

    fn close(&self) {
        let detector = {
            let mut slot = self.detector.lock();
            slot.closed = true;
            mem::take(&mut slot.detector)
        };
        close_displaced(detector);
        if self.base.close_resources() {
            debug!(mode = self.name(), "integration mode closed");
        }
    }
}

/// Close a detector that has just been displaced
fn close_displaced(previous: Option<Box<dyn CoincidenceDetector>>) {
    if let Some(mut previous) = previous {
        debug!(detector = previous.name(), "closing displaced coincidence detector");
        previous.close();
    }
}

impl Drop for ActiveDendriteMode {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coincidence::{CoincidenceDetectorConfig, TemporalDetectorConfig};
    use crate::DendriticError;
    use approx::assert_abs_diff_eq;

    fn mode(config: ActiveDendriteConfig) -> ActiveDendriteMode {
        ActiveDendriteMode::new(BiologicalConfig::default().without_noise(), config).unwrap()
    }

    fn depolarized() -> MembraneSnapshot {
        MembraneSnapshot {
            accumulator: 0.6,
            ..MembraneSnapshot::default()
        }
    }

    #[test]
    fn test_single_input_saturates() {
        let mode = mode(ActiveDendriteConfig::default());
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 50.0), t0);

        let result = mode.process_at(&MembraneSnapshot::default(), t0).unwrap();
        assert_abs_diff_eq!(result.contribution("excitation"), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.net_current, 2.0, epsilon = 1e-12);
        assert!(!result.dendritic_spike);
    }

    #[test]
    fn test_fallback_spike_at_exact_threshold() {
        let mode = mode(ActiveDendriteConfig::default());
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 1.5), t0);

        let result = mode.process_at(&depolarized(), t0).unwrap();
        assert!(result.dendritic_spike);
        assert_abs_diff_eq!(result.net_current, 1.5 + 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.calcium_current, 0.5, epsilon = 1e-12);
        assert_eq!(result.contribution("nmda_spike"), 2.0);
    }

    #[test]
    fn test_fallback_requires_depolarized_soma() {
        let mode = mode(ActiveDendriteConfig::default());
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 1.5), t0);

        let result = mode.process_at(&MembraneSnapshot::default(), t0).unwrap();
        assert!(!result.dendritic_spike);
        assert_abs_diff_eq!(result.net_current, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_detector_replaces_fallback_rule() {
        let config = ActiveDendriteConfig {
            coincidence_detector: Some(CoincidenceDetectorConfig::Temporal(
                TemporalDetectorConfig::default(),
            )),
            ..ActiveDendriteConfig::default()
        };
        let mode = mode(config);
        assert!(mode.has_coincidence_detector());

        // Above the fallback threshold but too few inputs for the detector
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 1.8), t0);
        let result = mode.process_at(&depolarized(), t0).unwrap();
        assert!(!result.dendritic_spike);
        assert_abs_diff_eq!(result.net_current, 1.8, epsilon = 1e-12);

        for _ in 0..3 {
            mode.handle_at(SynapticSignal::new("proximal", 0.5), t0);
        }
        let result = mode.process_at(&depolarized(), t0).unwrap();
        assert!(result.dendritic_spike);
        assert_eq!(result.nonlinear_amplification, 1.5);
        // 1.5 · 1.5 + 0.5, no fallback boost
        assert_abs_diff_eq!(result.net_current, 2.75, epsilon = 1e-12);
        assert_eq!(result.contribution("nmda_spike"), 0.0);
        assert_abs_diff_eq!(result.calcium_current, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_biological_config_rejected_with_detector() {
        let config = ActiveDendriteConfig {
            coincidence_detector: Some(CoincidenceDetectorConfig::default()),
            ..ActiveDendriteConfig::default()
        };
        let biological = BiologicalConfig::default().with_membrane_time_constant(Duration::ZERO);
        assert!(matches!(
            ActiveDendriteMode::new(biological, config),
            Err(DendriticError::InvalidTimeConstant { .. })
        ));
    }

    #[test]
    fn test_shunting_applies_before_spike_rule() {
        let mode = mode(ActiveDendriteConfig::default());
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 2.0), t0);
        mode.handle_at(SynapticSignal::new("proximal", -1.0), t0);

        // 2.0 · 0.5 = 1.0 < 1.5: no spike
        let result = mode.process_at(&depolarized(), t0).unwrap();
        assert!(!result.dendritic_spike);
        assert_abs_diff_eq!(result.net_current, 1.0, epsilon = 1e-12);
    }
}

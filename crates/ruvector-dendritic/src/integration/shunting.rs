//! Divisive (shunting) inhibition
//!
//! Inhibitory conductance near rest divides excitation rather than
//! subtracting from it:
//!
//! ```text
//! shunt = max(floor, 1 − inhibition · strength)
//! net   = excitation · shunt
//! ```
//!
//! The floor keeps the excitatory path from ever being fully silenced.

use super::{
    finish, reject_detector, BiologicalTemporalSummationMode, DendriticIntegrationMode,
};
use crate::channel::{ChannelFeedback, IonChannel};
use crate::coincidence::CoincidenceDetector;
use crate::config::{BiologicalConfig, ShuntingConfig};
use crate::types::{IntegratedPotential, MembraneSnapshot, SynapticSignal};
use crate::Result;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Shunt factor for an inhibition level, never below `config.floor`
#[inline]
pub fn shunt_factor(inhibition: f64, config: &ShuntingConfig) -> f64 {
    (1.0 - inhibition * config.strength).max(config.floor)
}

/// Biological decay followed by divisive inhibition.
#[derive(Debug)]
pub struct ShuntingInhibitionMode {
    base: BiologicalTemporalSummationMode,
    shunting: ShuntingConfig,
}

impl ShuntingInhibitionMode {
    /// Create a mode after validating both configs
    pub fn new(biological: BiologicalConfig, shunting: ShuntingConfig) -> Result<Self> {
        shunting.validate()?;
        Ok(Self {
            base: BiologicalTemporalSummationMode::new(biological)?,
            shunting,
        })
    }

    /// Embedded decay engine
    pub fn base(&self) -> &BiologicalTemporalSummationMode {
        &self.base
    }

    /// Shunting parameters
    pub fn shunting(&self) -> &ShuntingConfig {
        &self.shunting
    }

    /// Pin the noise seed
    pub fn set_noise_seed(&self, seed: u64) {
        self.base.set_noise_seed(seed);
    }
}

impl DendriticIntegrationMode for ShuntingInhibitionMode {
    fn name(&self) -> &'static str {
        "shunting_inhibition"
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

        let components = self.base.decayed_components(&batch, now, None);
        let shunt = shunt_factor(components.inhibition, &self.shunting);
        let net = components.excitation * shunt;
        trace!(
            inputs = batch.len(),
            excitation = components.excitation,
            inhibition = components.inhibition,
            shunt,
            net,
            "shunting tick"
        );

        let mut potential = components.into_potential();
        potential.add_contribution("shunt_factor", shunt);
        finish(potential, net)
    }

    fn set_coincidence_detector(&self, detector: Box<dyn CoincidenceDetector>) {
        reject_detector(self.name(), detector);
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
        if self.base.close_resources() {
            debug!(mode = self.name(), "integration mode closed");
        }
    }
}

impl Drop for ShuntingInhibitionMode {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mode() -> ShuntingInhibitionMode {
        ShuntingInhibitionMode::new(
            BiologicalConfig::default().without_noise(),
            ShuntingConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_shunt_factor_floor() {
        let config = ShuntingConfig::default();
        assert_eq!(shunt_factor(0.0, &config), 1.0);
        assert_abs_diff_eq!(shunt_factor(1.0, &config), 0.5, epsilon = 1e-12);
        assert_eq!(shunt_factor(1e9, &config), 0.1);
    }

    #[test]
    fn test_inhibition_divides_excitation() {
        let mode = mode();
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", 2.0), t0);
        mode.handle_at(SynapticSignal::new("proximal", -1.0), t0);

        let result = mode.process_at(&MembraneSnapshot::default(), t0).unwrap();
        // shunt = 1 - 1.0 * 0.5
        assert_abs_diff_eq!(result.net_current, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.contribution("shunt_factor"), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_pure_inhibition_has_no_effect() {
        let mode = mode();
        let t0 = Instant::now();
        mode.handle_at(SynapticSignal::new("proximal", -3.0), t0);
        assert!(mode.process_at(&MembraneSnapshot::default(), t0).is_none());
    }

    #[test]
    fn test_rejects_zero_floor() {
        let shunting = ShuntingConfig {
            floor: 0.0,
            ..ShuntingConfig::default()
        };
        assert!(ShuntingInhibitionMode::new(BiologicalConfig::default(), shunting).is_err());
    }
}

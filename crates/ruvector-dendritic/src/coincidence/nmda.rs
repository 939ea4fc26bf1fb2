//! NMDA receptor coincidence detection
//!
//! NMDA receptors pass current only when glutamate is bound *and* the
//! membrane is depolarized enough to expel the Mg²⁺ ion from the pore
//! (Jahr & Stevens 1990):
//!
//! ```text
//! B(V) = 1 / (1 + [Mg²⁺]/3.57 · e^(−0.062·V))
//! ```
//!
//! The local dendritic voltage is the somatic estimate plus the depolarization
//! of the coincident glutamatergic inputs, plus a fixed boost while a
//! back-propagating spike invades the dendrite.

use super::{within_window, CoincidenceDetector, CoincidenceResult};
use crate::constants::{
    BACK_PROPAGATING_SPIKE_DEPOLARIZATION, MAGNESIUM_CONCENTRATION, MG_BLOCK_DISSOCIATION,
    MG_BLOCK_VOLTAGE_SENSITIVITY, MILLIVOLTS_PER_ACCUMULATOR_UNIT, NMDA_AMPLIFICATION,
    NMDA_CALCIUM_PER_INPUT, NMDA_COINCIDENCE_WINDOW, NMDA_CURRENT_PER_INPUT,
    NMDA_MIN_COINCIDENT_INPUTS, NMDA_VOLTAGE_THRESHOLD,
};
use crate::error::{ensure_finite, ensure_non_negative, ensure_time_constant, DendriticError};
use crate::types::{MembraneSnapshot, TimestampedInput};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Fraction of NMDA receptors relieved of the Mg²⁺ block at `voltage` (mV)
#[inline]
pub fn magnesium_unblock(voltage: f64, magnesium: f64) -> f64 {
    1.0 / (1.0
        + magnesium / MG_BLOCK_DISSOCIATION * (-MG_BLOCK_VOLTAGE_SENSITIVITY * voltage).exp())
}

/// NMDA detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmdaDetectorConfig {
    /// Glutamate coincidence window
    pub window: Duration,
    /// Local voltage required for unblocking (mV)
    pub voltage_threshold: f64,
    /// Glutamatergic inputs required within the window
    pub min_inputs: usize,
    /// Extracellular Mg²⁺ (mM)
    pub magnesium_concentration: f64,
    /// Gain at full unblock
    pub max_amplification: f64,
    /// Extra current per coincident input at full unblock
    pub current_per_input: f64,
    /// Calcium influx per coincident input at full unblock
    pub calcium_per_input: f64,
    /// Dendritic depolarization from a back-propagating spike (mV)
    pub back_propagation_depolarization: f64,
}

impl Default for NmdaDetectorConfig {
    fn default() -> Self {
        Self {
            window: NMDA_COINCIDENCE_WINDOW,
            voltage_threshold: NMDA_VOLTAGE_THRESHOLD,
            min_inputs: NMDA_MIN_COINCIDENT_INPUTS,
            magnesium_concentration: MAGNESIUM_CONCENTRATION,
            max_amplification: NMDA_AMPLIFICATION,
            current_per_input: NMDA_CURRENT_PER_INPUT,
            calcium_per_input: NMDA_CALCIUM_PER_INPUT,
            back_propagation_depolarization: BACK_PROPAGATING_SPIKE_DEPOLARIZATION,
        }
    }
}

impl NmdaDetectorConfig {
    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        ensure_time_constant("nmda_window", self.window)?;
        ensure_finite("nmda_voltage_threshold", self.voltage_threshold)?;
        if self.min_inputs == 0 {
            return Err(DendriticError::InvalidParameter {
                name: "nmda_min_inputs",
                reason: "at least one coincident input is required".to_string(),
            });
        }
        ensure_non_negative("magnesium_concentration", self.magnesium_concentration)?;
        if self.max_amplification.is_nan() || self.max_amplification < 1.0 {
            return Err(DendriticError::InvalidParameter {
                name: "nmda_max_amplification",
                reason: format!("{} must be at least 1.0", self.max_amplification),
            });
        }
        ensure_non_negative("nmda_current_per_input", self.current_per_input)?;
        ensure_non_negative("nmda_calcium_per_input", self.calcium_per_input)?;
        ensure_non_negative(
            "back_propagation_depolarization",
            self.back_propagation_depolarization,
        )
    }
}

/// Detector requiring coincident glutamate and Mg²⁺ unblock.
#[derive(Debug, Clone)]
pub struct NmdaCoincidenceDetector {
    config: NmdaDetectorConfig,
    detections: u64,
    closed: bool,
}

impl NmdaCoincidenceDetector {
    /// Create a detector after validating `config`
    pub fn new(config: NmdaDetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            detections: 0,
            closed: false,
        })
    }

    /// Parameters
    pub fn config(&self) -> &NmdaDetectorConfig {
        &self.config
    }

    /// Coincidences detected since construction
    pub fn detections(&self) -> u64 {
        self.detections
    }
}

impl CoincidenceDetector for NmdaCoincidenceDetector {
    fn name(&self) -> &str {
        "nmda"
    }

    fn detect(
        &mut self,
        inputs: &[TimestampedInput],
        snapshot: &MembraneSnapshot,
    ) -> CoincidenceResult {
        if self.closed {
            return CoincidenceResult::none();
        }

        // Glutamate: excitatory inputs inside the window
        let (count, drive) = within_window(inputs, self.config.window)
            .filter(|input| !input.signal.is_inhibitory() && input.weighted_value() > 0.0)
            .fold((0usize, 0.0), |(count, drive), input| {
                (count + 1, drive + input.weighted_value())
            });
        if count < self.config.min_inputs {
            return CoincidenceResult::none();
        }

        let mut voltage = snapshot.membrane_voltage() + drive * MILLIVOLTS_PER_ACCUMULATOR_UNIT;
        if snapshot.back_propagating_spike {
            voltage += self.config.back_propagation_depolarization;
        }
        if voltage < self.config.voltage_threshold {
            trace!(count, voltage, "nmda: glutamate without depolarization");
            return CoincidenceResult::none();
        }

        let unblock = magnesium_unblock(voltage, self.config.magnesium_concentration);
        let n = count as f64;
        self.detections += 1;
        CoincidenceResult::detected(
            1.0 + (self.config.max_amplification - 1.0) * unblock,
            self.config.current_per_input * n * unblock,
            self.config.calcium_per_input * n * unblock,
        )
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Neurotransmitter, SynapticSignal};
    use approx::assert_relative_eq;
    use std::time::Instant;

    fn batch(values: &[f64], spacing: Duration) -> Vec<TimestampedInput> {
        let base = Instant::now();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let arrival = base + spacing * i as u32;
                TimestampedInput::new(
                    SynapticSignal::new("proximal", value).with_timestamp(arrival),
                    arrival,
                    1.0,
                )
            })
            .collect()
    }

    fn detector() -> NmdaCoincidenceDetector {
        NmdaCoincidenceDetector::new(NmdaDetectorConfig::default()).unwrap()
    }

    #[test]
    fn test_unblock_increases_with_depolarization() {
        let mut last = 0.0;
        for v in (-100..=40).step_by(10) {
            let b = magnesium_unblock(v as f64, MAGNESIUM_CONCENTRATION);
            assert!(b > last);
            assert!(b < 1.0);
            last = b;
        }
        assert_relative_eq!(magnesium_unblock(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_detects_coincident_glutamate() {
        let mut nmda = detector();
        let inputs = batch(&[1.0, 1.0, 1.0], Duration::from_millis(2));
        let result = nmda.detect(&inputs, &MembraneSnapshot::default());

        // -70 mV + 3 units of drive = -40 mV
        let unblock = magnesium_unblock(-40.0, MAGNESIUM_CONCENTRATION);
        assert!(result.detected);
        assert_relative_eq!(result.amplification_factor, 1.0 + unblock, epsilon = 1e-12);
        assert_relative_eq!(result.additional_current, 1.5 * unblock, epsilon = 1e-12);
        assert_relative_eq!(result.calcium_influx, 0.3 * unblock, epsilon = 1e-12);
        assert_eq!(nmda.detections(), 1);
    }

    #[test]
    fn test_requires_enough_inputs() {
        let mut nmda = detector();
        let inputs = batch(&[1.0, 1.0], Duration::ZERO);
        assert!(!nmda.detect(&inputs, &MembraneSnapshot::default()).detected);
    }

    #[test]
    fn test_inputs_outside_window_ignored() {
        let mut nmda = detector();
        let inputs = batch(&[1.0, 1.0, 1.0], Duration::from_millis(15));
        assert!(!nmda.detect(&inputs, &MembraneSnapshot::default()).detected);
    }

    #[test]
    fn test_gaba_is_not_glutamate() {
        let mut nmda = detector();
        let mut inputs = batch(&[1.0, 1.0, 1.0], Duration::ZERO);
        inputs[0].signal.neurotransmitter = Neurotransmitter::Gaba;
        assert!(!nmda.detect(&inputs, &MembraneSnapshot::default()).detected);
    }

    #[test]
    fn test_back_propagating_spike_relieves_block() {
        let mut nmda = detector();
        let inputs = batch(&[0.1, 0.1, 0.1], Duration::ZERO);
        let quiet = MembraneSnapshot::default();
        assert!(!nmda.detect(&inputs, &quiet).detected);

        let bap = MembraneSnapshot {
            back_propagating_spike: true,
            ..MembraneSnapshot::default()
        };
        assert!(nmda.detect(&inputs, &bap).detected);
    }

    #[test]
    fn test_rejects_sub_unity_amplification() {
        let config = NmdaDetectorConfig {
            max_amplification: 0.5,
            ..NmdaDetectorConfig::default()
        };
        assert!(NmdaCoincidenceDetector::new(config).is_err());
    }
}

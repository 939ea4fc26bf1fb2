//! Simple temporal coincidence: at least N inputs inside a window.

use super::{within_window, CoincidenceDetector, CoincidenceResult};
use crate::constants::{
    TEMPORAL_ADDITIONAL_CURRENT, TEMPORAL_AMPLIFICATION, TEMPORAL_CALCIUM_INFLUX,
    TEMPORAL_COINCIDENCE_WINDOW, TEMPORAL_MIN_INPUTS,
};
use crate::error::{ensure_non_negative, ensure_time_constant, DendriticError};
use crate::types::{MembraneSnapshot, TimestampedInput};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Temporal detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalDetectorConfig {
    /// Coincidence window
    pub window: Duration,
    /// Inputs required inside the window
    pub min_inputs: usize,
    /// Gain applied on detection
    pub amplification: f64,
    /// Extra current on detection
    pub additional_current: f64,
    /// Calcium influx on detection
    pub calcium_influx: f64,
}

impl Default for TemporalDetectorConfig {
    fn default() -> Self {
        Self {
            window: TEMPORAL_COINCIDENCE_WINDOW,
            min_inputs: TEMPORAL_MIN_INPUTS,
            amplification: TEMPORAL_AMPLIFICATION,
            additional_current: TEMPORAL_ADDITIONAL_CURRENT,
            calcium_influx: TEMPORAL_CALCIUM_INFLUX,
        }
    }
}

impl TemporalDetectorConfig {
    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        ensure_time_constant("temporal_window", self.window)?;
        if self.min_inputs == 0 {
            return Err(DendriticError::InvalidParameter {
                name: "temporal_min_inputs",
                reason: "at least one input is required".to_string(),
            });
        }
        ensure_non_negative("temporal_amplification", self.amplification)?;
        ensure_non_negative("temporal_additional_current", self.additional_current)?;
        ensure_non_negative("temporal_calcium_influx", self.calcium_influx)
    }
}

/// Counts inputs in a window, regardless of sign or voltage.
#[derive(Debug, Clone)]
pub struct TemporalCoincidenceDetector {
    config: TemporalDetectorConfig,
    closed: bool,
}

impl TemporalCoincidenceDetector {
    /// Create a detector after validating `config`
    pub fn new(config: TemporalDetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            closed: false,
        })
    }

    /// Parameters
    pub fn config(&self) -> &TemporalDetectorConfig {
        &self.config
    }
}

impl CoincidenceDetector for TemporalCoincidenceDetector {
    fn name(&self) -> &str {
        "temporal"
    }

    fn detect(
        &mut self,
        inputs: &[TimestampedInput],
        _snapshot: &MembraneSnapshot,
    ) -> CoincidenceResult {
        if self.closed {
            return CoincidenceResult::none();
        }
        if within_window(inputs, self.config.window).count() < self.config.min_inputs {
            return CoincidenceResult::none();
        }
        CoincidenceResult::detected(
            self.config.amplification,
            self.config.additional_current,
            self.config.calcium_influx,
        )
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SynapticSignal;
    use std::time::Instant;

    fn inputs(offsets_ms: &[u64]) -> Vec<TimestampedInput> {
        let base = Instant::now();
        offsets_ms
            .iter()
            .map(|&ms| {
                let arrival = base + Duration::from_millis(ms);
                TimestampedInput::new(SynapticSignal::new("basal", -0.5), arrival, 0.8)
            })
            .collect()
    }

    #[test]
    fn test_counts_inputs_in_window() {
        let mut detector =
            TemporalCoincidenceDetector::new(TemporalDetectorConfig::default()).unwrap();
        let snapshot = MembraneSnapshot::default();

        let result = detector.detect(&inputs(&[0, 4, 9]), &snapshot);
        assert!(result.detected);
        assert_eq!(result.amplification_factor, 1.5);
        assert_eq!(result.additional_current, 0.5);

        assert!(!detector.detect(&inputs(&[0, 20, 25]), &snapshot).detected);
        assert!(!detector.detect(&[], &snapshot).detected);
    }

    #[test]
    fn test_closed_detector_never_fires() {
        let mut detector =
            TemporalCoincidenceDetector::new(TemporalDetectorConfig::default()).unwrap();
        detector.close();
        let result = detector.detect(&inputs(&[0, 1, 2, 3]), &MembraneSnapshot::default());
        assert_eq!(result, CoincidenceResult::none());
    }

    #[test]
    fn test_rejects_zero_inputs() {
        let config = TemporalDetectorConfig {
            min_inputs: 0,
            ..TemporalDetectorConfig::default()
        };
        assert!(TemporalCoincidenceDetector::new(config).is_err());
    }
}

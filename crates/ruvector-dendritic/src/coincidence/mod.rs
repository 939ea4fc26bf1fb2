//! Coincidence detection over one tick's input batch
//!
//! A detector sees exactly the inputs drained for the tick, in arrival
//! order, together with the membrane snapshot. On detection it returns the
//! gain, extra current and calcium influx the active dendrite applies.
//!
//! - [`NmdaCoincidenceDetector`]: glutamate within a short window *and*
//!   enough depolarization to relieve the Mg²⁺ block
//! - [`TemporalCoincidenceDetector`]: at least N inputs within a window

mod nmda;
mod temporal;

pub use nmda::{magnesium_unblock, NmdaCoincidenceDetector, NmdaDetectorConfig};
pub use temporal::{TemporalCoincidenceDetector, TemporalDetectorConfig};

use crate::types::{MembraneSnapshot, TimestampedInput};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Outcome of [`CoincidenceDetector::detect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoincidenceResult {
    /// A coincidence was detected this tick
    pub detected: bool,
    /// Gain applied to the net current (1.0 when not detected)
    pub amplification_factor: f64,
    /// Current added after amplification
    pub additional_current: f64,
    /// Calcium influx associated with the event
    pub calcium_influx: f64,
}

impl Default for CoincidenceResult {
    fn default() -> Self {
        Self::none()
    }
}

impl CoincidenceResult {
    /// No coincidence
    pub const fn none() -> Self {
        Self {
            detected: false,
            amplification_factor: 1.0,
            additional_current: 0.0,
            calcium_influx: 0.0,
        }
    }

    /// A detected coincidence
    pub fn detected(
        amplification_factor: f64,
        additional_current: f64,
        calcium_influx: f64,
    ) -> Self {
        Self {
            detected: true,
            amplification_factor,
            additional_current,
            calcium_influx,
        }
    }
}

/// Nonlinear detector of coincident synaptic input.
///
/// Detectors are exclusively owned by one integration mode, which closes
/// them exactly once.
pub trait CoincidenceDetector: Send + fmt::Debug {
    /// Detector name, used in logs
    fn name(&self) -> &str;

    /// Inspect the batch drained for this tick
    fn detect(
        &mut self,
        inputs: &[TimestampedInput],
        snapshot: &MembraneSnapshot,
    ) -> CoincidenceResult;

    /// Release internal state; the detector must not be used afterwards
    fn close(&mut self);
}

/// Detector selection and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoincidenceDetectorConfig {
    /// NMDA receptor coincidence detection
    Nmda(NmdaDetectorConfig),
    /// Simple temporal coincidence detection
    Temporal(TemporalDetectorConfig),
}

impl Default for CoincidenceDetectorConfig {
    fn default() -> Self {
        CoincidenceDetectorConfig::Nmda(NmdaDetectorConfig::default())
    }
}

impl CoincidenceDetectorConfig {
    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        match self {
            CoincidenceDetectorConfig::Nmda(config) => config.validate(),
            CoincidenceDetectorConfig::Temporal(config) => config.validate(),
        }
    }

    /// Validate and construct the detector
    pub fn build(&self) -> Result<Box<dyn CoincidenceDetector>> {
        let detector: Box<dyn CoincidenceDetector> = match self {
            CoincidenceDetectorConfig::Nmda(config) => {
                Box::new(NmdaCoincidenceDetector::new(config.clone())?)
            }
            CoincidenceDetectorConfig::Temporal(config) => {
                Box::new(TemporalCoincidenceDetector::new(config.clone())?)
            }
        };
        Ok(detector)
    }
}

/// Inputs that arrived within `window` of the newest arrival in the batch
pub(crate) fn within_window(
    inputs: &[TimestampedInput],
    window: Duration,
) -> impl Iterator<Item = &TimestampedInput> {
    let latest: Option<Instant> = inputs.iter().map(|input| input.arrival).max();
    inputs.iter().filter(move |input| match latest {
        Some(latest) => latest.saturating_duration_since(input.arrival) <= window,
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SynapticSignal;

    fn input_at(base: Instant, offset_ms: u64) -> TimestampedInput {
        let arrival = base + Duration::from_millis(offset_ms);
        TimestampedInput::new(
            SynapticSignal::new("proximal", 1.0).with_timestamp(arrival),
            arrival,
            1.0,
        )
    }

    #[test]
    fn test_window_anchored_at_latest_arrival() {
        let base = Instant::now();
        let inputs = vec![input_at(base, 0), input_at(base, 25), input_at(base, 30)];
        assert_eq!(within_window(&inputs, Duration::from_millis(10)).count(), 2);
        assert_eq!(within_window(&inputs, Duration::from_millis(30)).count(), 3);
        assert_eq!(within_window(&[], Duration::from_millis(30)).count(), 0);
    }

    #[test]
    fn test_config_builds_each_variant() {
        let nmda = CoincidenceDetectorConfig::default().build().unwrap();
        assert_eq!(nmda.name(), "nmda");

        let temporal = CoincidenceDetectorConfig::Temporal(TemporalDetectorConfig::default())
            .build()
            .unwrap();
        assert_eq!(temporal.name(), "temporal");
    }

    #[test]
    fn test_tagged_config_deserializes() {
        let config: CoincidenceDetectorConfig =
            serde_json::from_str(r#"{ "type": "temporal", "min_inputs": 5 }"#).unwrap();
        match config {
            CoincidenceDetectorConfig::Temporal(temporal) => {
                assert_eq!(temporal.min_inputs, 5);
                assert_eq!(temporal.window, Duration::from_millis(10));
            }
            other => panic!("unexpected detector config {other:?}"),
        }
    }
}

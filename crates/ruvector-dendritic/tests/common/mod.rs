//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use ruvector_dendritic::{
    BiologicalConfig, ChannelFeedback, ChannelKind, ChannelModulation, ChannelState,
    ChannelTrigger, CoincidenceDetector, CoincidenceResult, GateSteadyState, GatingDecision,
    IonChannel, IonSelectivity, MembraneSnapshot, SynapticSignal, TimestampedInput,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Biological parameters with noise and jitter disabled
pub fn quiet() -> BiologicalConfig {
    BiologicalConfig::default().without_noise()
}

/// Somatic state above the dendritic voltage threshold
pub fn depolarized() -> MembraneSnapshot {
    MembraneSnapshot {
        accumulator: 0.6,
        ..MembraneSnapshot::default()
    }
}

/// Shared close counter handed to counting fixtures
#[derive(Debug, Clone, Default)]
pub struct CloseCounter(Arc<AtomicUsize>);

impl CloseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pass-through channel that records how often it is closed
#[derive(Debug)]
pub struct CountingChannel {
    name: String,
    trigger: ChannelTrigger,
    closes: CloseCounter,
    closed: bool,
}

impl CountingChannel {
    pub fn boxed(name: &str, closes: &CloseCounter) -> Box<dyn IonChannel> {
        Box::new(Self {
            name: name.to_string(),
            trigger: ChannelTrigger::default(),
            closes: closes.clone(),
            closed: false,
        })
    }
}

impl IonChannel for CountingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Sodium
    }

    fn modulate_current(
        &mut self,
        signal: &SynapticSignal,
        _voltage: f64,
        _calcium: f64,
    ) -> ChannelModulation {
        ChannelModulation::pass(signal.clone(), 0.0)
    }

    fn should_open(
        &mut self,
        _voltage: f64,
        _ligand_concentration: f64,
        _calcium: f64,
        _dt: Duration,
    ) -> GatingDecision {
        GatingDecision {
            open: false,
            expected_open_duration: Duration::ZERO,
            probability: 0.0,
        }
    }

    fn update_kinetics(&mut self, _feedback: &ChannelFeedback, _dt: Duration, _voltage: f64) {}

    fn steady_state(&self, _voltage: f64) -> GateSteadyState {
        GateSteadyState {
            activation: 0.0,
            inactivation: 1.0,
        }
    }

    fn state(&self) -> ChannelState {
        ChannelState {
            is_open: false,
            conductance: 0.0,
            membrane_voltage: -70.0,
            calcium_level: 0.0001,
            opened_at: None,
            inactivated_at: None,
        }
    }

    fn trigger(&self) -> &ChannelTrigger {
        &self.trigger
    }

    fn conductance(&self) -> f64 {
        0.0
    }

    fn reversal_potential(&self) -> f64 {
        50.0
    }

    fn ion_selectivity(&self) -> IonSelectivity {
        IonSelectivity::Sodium
    }

    fn close(&mut self) {
        self.closed = true;
        self.closes.bump();
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Detector that never fires and records how often it is closed
#[derive(Debug)]
pub struct CountingDetector {
    closes: CloseCounter,
}

impl CountingDetector {
    pub fn boxed(closes: &CloseCounter) -> Box<dyn CoincidenceDetector> {
        Box::new(Self {
            closes: closes.clone(),
        })
    }
}

impl CoincidenceDetector for CountingDetector {
    fn name(&self) -> &str {
        "counting"
    }

    fn detect(
        &mut self,
        _inputs: &[TimestampedInput],
        _snapshot: &MembraneSnapshot,
    ) -> CoincidenceResult {
        CoincidenceResult::none()
    }

    fn close(&mut self) {
        self.closes.bump();
    }
}

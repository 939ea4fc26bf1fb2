//! Shared data model: signals in, membrane context in, integrated potential out.

use crate::constants::{
    APICAL_WEIGHT, BASAL_WEIGHT, DISTAL_WEIGHT, MAX_NET_CURRENT, MILLIVOLTS_PER_ACCUMULATOR_UNIT,
    MIN_NET_CURRENT, PROXIMAL_WEIGHT, RESTING_CALCIUM, RESTING_POTASSIUM, RESTING_POTENTIAL,
    RESTING_SODIUM,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Transmitter released by the presynaptic terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neurotransmitter {
    /// Excitatory glutamatergic input (AMPA/NMDA)
    Glutamate,
    /// Inhibitory GABAergic input (GABA-A)
    Gaba,
    /// Sign of the value decides
    #[default]
    Unspecified,
}

/// A synaptic signal delivered by the message-delivery path.
#[derive(Debug, Clone, PartialEq)]
pub struct SynapticSignal {
    /// Signed strength; positive is excitatory, negative inhibitory
    pub value: f64,
    /// When the presynaptic neuron emitted the signal
    pub timestamp: Instant,
    /// Presynaptic source or branch label (e.g. `"proximal_12"`)
    pub source_id: String,
    /// Released transmitter
    pub neurotransmitter: Neurotransmitter,
}

impl SynapticSignal {
    /// Create a signal stamped with the current instant
    pub fn new(source_id: impl Into<String>, value: f64) -> Self {
        Self {
            value,
            timestamp: Instant::now(),
            source_id: source_id.into(),
            neurotransmitter: Neurotransmitter::Unspecified,
        }
    }

    /// Override the emission timestamp
    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Tag the released transmitter
    pub fn with_neurotransmitter(mut self, neurotransmitter: Neurotransmitter) -> Self {
        self.neurotransmitter = neurotransmitter;
        self
    }

    /// True for GABAergic or negative-valued signals
    pub fn is_inhibitory(&self) -> bool {
        match self.neurotransmitter {
            Neurotransmitter::Gaba => true,
            Neurotransmitter::Glutamate => false,
            Neurotransmitter::Unspecified => self.value < 0.0,
        }
    }

    /// Dendritic location declared by the source label
    pub fn location(&self) -> DendriticLocation {
        DendriticLocation::from_source(&self.source_id)
    }
}

/// Dendritic compartment an input lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DendriticLocation {
    /// Close to the soma; no attenuation
    Proximal,
    /// Basal dendrites
    Basal,
    /// Apical dendrites (default when unlabeled)
    Apical,
    /// Distal tuft; strongest attenuation
    Distal,
}

impl DendriticLocation {
    const ALL: [DendriticLocation; 4] = [
        DendriticLocation::Proximal,
        DendriticLocation::Basal,
        DendriticLocation::Apical,
        DendriticLocation::Distal,
    ];

    /// Parse a location from a label containing its name, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|location| label.contains(location.name()))
    }

    /// Location for a source label, falling back to [`DendriticLocation::Apical`]
    pub fn from_source(source_id: &str) -> Self {
        Self::from_label(source_id).unwrap_or(DendriticLocation::Apical)
    }

    /// Passive cable attenuation toward the soma
    pub fn weight(self) -> f64 {
        match self {
            DendriticLocation::Proximal => PROXIMAL_WEIGHT,
            DendriticLocation::Basal => BASAL_WEIGHT,
            DendriticLocation::Apical => APICAL_WEIGHT,
            DendriticLocation::Distal => DISTAL_WEIGHT,
        }
    }

    /// Lowercase label
    pub fn name(self) -> &'static str {
        match self {
            DendriticLocation::Proximal => "proximal",
            DendriticLocation::Basal => "basal",
            DendriticLocation::Apical => "apical",
            DendriticLocation::Distal => "distal",
        }
    }
}

/// Ion a channel is permeable to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IonSelectivity {
    /// Na⁺
    Sodium,
    /// K⁺
    Potassium,
    /// Ca²⁺
    Calcium,
    /// Cl⁻
    Chloride,
}

impl fmt::Display for IonSelectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            IonSelectivity::Sodium => "Na+",
            IonSelectivity::Potassium => "K+",
            IonSelectivity::Calcium => "Ca2+",
            IonSelectivity::Chloride => "Cl-",
        };
        f.write_str(symbol)
    }
}

/// Current produced by one channel while a signal passed through it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelCurrent {
    /// Name of the channel that produced the current
    pub channel: String,
    /// Carrying ion
    pub ion: IonSelectivity,
    /// Signed current (positive depolarizes)
    pub current: f64,
}

/// A buffered input awaiting the next integration tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedInput {
    /// The signal as it left the channel chain
    pub signal: SynapticSignal,
    /// When the input reached the dendrite (possibly jittered)
    pub arrival: Instant,
    /// Cable attenuation applied to the signal value
    pub spatial_weight: f64,
    /// Currents contributed by each channel in the chain
    pub channel_currents: Vec<ChannelCurrent>,
}

impl TimestampedInput {
    /// Create an input with no channel currents
    pub fn new(signal: SynapticSignal, arrival: Instant, spatial_weight: f64) -> Self {
        Self {
            signal,
            arrival,
            spatial_weight,
            channel_currents: Vec::new(),
        }
    }

    /// Signal value after spatial attenuation
    pub fn weighted_value(&self) -> f64 {
        self.signal.value * self.spatial_weight
    }
}

/// Read-only membrane context produced by the owning neuron once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MembraneSnapshot {
    /// Somatic accumulator (depolarization above rest, accumulator units)
    pub accumulator: f64,
    /// Current dynamic firing threshold (accumulator units)
    pub current_threshold: f64,
    /// Resting membrane potential (mV)
    pub resting_potential: f64,
    /// Intracellular Ca²⁺ (mM)
    pub intracellular_calcium: f64,
    /// Intracellular Na⁺ (mM)
    pub intracellular_sodium: f64,
    /// Intracellular K⁺ (mM)
    pub intracellular_potassium: f64,
    /// Last somatic spike
    pub last_spike_time: Option<Instant>,
    /// Somatic spikes in the recent history window
    pub recent_spike_count: u32,
    /// A somatic spike is currently invading the dendrites
    pub back_propagating_spike: bool,
    /// Normalized ATP availability (1.0 = healthy)
    pub atp_level: f64,
    /// Normalized metabolic stress (0.0 = none)
    pub metabolic_stress: f64,
}

impl Default for MembraneSnapshot {
    fn default() -> Self {
        Self {
            accumulator: 0.0,
            current_threshold: 1.0,
            resting_potential: RESTING_POTENTIAL,
            intracellular_calcium: RESTING_CALCIUM,
            intracellular_sodium: RESTING_SODIUM,
            intracellular_potassium: RESTING_POTASSIUM,
            last_spike_time: None,
            recent_spike_count: 0,
            back_propagating_spike: false,
            atp_level: 1.0,
            metabolic_stress: 0.0,
        }
    }
}

impl MembraneSnapshot {
    /// Estimated membrane voltage in millivolts
    pub fn membrane_voltage(&self) -> f64 {
        self.resting_potential + self.accumulator * MILLIVOLTS_PER_ACCUMULATOR_UNIT
    }
}

/// Result of integrating dendritic input, folded into the somatic accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratedPotential {
    /// Net current delivered to the soma, within `[-100, 100]`
    pub net_current: f64,
    /// Na⁺ component
    pub sodium_current: f64,
    /// K⁺ component
    pub potassium_current: f64,
    /// Ca²⁺ component
    pub calcium_current: f64,
    /// Cl⁻ component
    pub chloride_current: f64,
    /// A regenerative dendritic event occurred
    pub dendritic_spike: bool,
    /// Nonlinear gain applied to the net current (1.0 = linear)
    pub nonlinear_amplification: f64,
    /// Named per-channel and per-mechanism contributions
    pub channel_contributions: HashMap<String, f64>,
}

impl Default for IntegratedPotential {
    fn default() -> Self {
        Self {
            net_current: 0.0,
            sodium_current: 0.0,
            potassium_current: 0.0,
            calcium_current: 0.0,
            chloride_current: 0.0,
            dendritic_spike: false,
            nonlinear_amplification: 1.0,
            channel_contributions: HashMap::new(),
        }
    }
}

impl IntegratedPotential {
    /// Result carrying only a (clamped) net current
    pub fn from_net(net_current: f64) -> Self {
        Self {
            net_current: clamp_current(net_current),
            ..Self::default()
        }
    }

    /// Add a current to the breakdown of its ion
    pub fn add_ion_current(&mut self, ion: IonSelectivity, current: f64) {
        match ion {
            IonSelectivity::Sodium => self.sodium_current += current,
            IonSelectivity::Potassium => self.potassium_current += current,
            IonSelectivity::Calcium => self.calcium_current += current,
            IonSelectivity::Chloride => self.chloride_current += current,
        }
    }

    /// Add to a named contribution
    pub fn add_contribution(&mut self, name: &str, value: f64) {
        *self
            .channel_contributions
            .entry(name.to_string())
            .or_insert(0.0) += value;
    }

    /// Named contribution, zero when absent
    pub fn contribution(&self, name: &str) -> f64 {
        self.channel_contributions.get(name).copied().unwrap_or(0.0)
    }
}

/// Clamp a current into the biological bounds
#[inline]
pub fn clamp_current(current: f64) -> f64 {
    current.clamp(MIN_NET_CURRENT, MAX_NET_CURRENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parsing() {
        assert_eq!(
            DendriticLocation::from_label("proximal"),
            Some(DendriticLocation::Proximal)
        );
        assert_eq!(
            DendriticLocation::from_label("L5_Distal_branch_3"),
            Some(DendriticLocation::Distal)
        );
        assert_eq!(DendriticLocation::from_label("neuron-42"), None);
        assert_eq!(
            DendriticLocation::from_source("neuron-42"),
            DendriticLocation::Apical
        );
    }

    #[test]
    fn test_location_weights() {
        assert_eq!(DendriticLocation::Proximal.weight(), 1.0);
        assert_eq!(DendriticLocation::Basal.weight(), 0.8);
        assert_eq!(DendriticLocation::Apical.weight(), 0.7);
        assert_eq!(DendriticLocation::Distal.weight(), 0.5);
    }

    #[test]
    fn test_signal_polarity() {
        assert!(!SynapticSignal::new("a", 1.0).is_inhibitory());
        assert!(SynapticSignal::new("a", -1.0).is_inhibitory());
        assert!(SynapticSignal::new("a", 1.0)
            .with_neurotransmitter(Neurotransmitter::Gaba)
            .is_inhibitory());
        assert!(!SynapticSignal::new("a", -1.0)
            .with_neurotransmitter(Neurotransmitter::Glutamate)
            .is_inhibitory());
    }

    #[test]
    fn test_integrated_potential_clamps() {
        assert_eq!(IntegratedPotential::from_net(250.0).net_current, 100.0);
        assert_eq!(IntegratedPotential::from_net(-250.0).net_current, -100.0);
        assert_eq!(IntegratedPotential::default().nonlinear_amplification, 1.0);
    }

    #[test]
    fn test_ion_breakdown() {
        let mut potential = IntegratedPotential::default();
        potential.add_ion_current(IonSelectivity::Sodium, 0.5);
        potential.add_ion_current(IonSelectivity::Sodium, 0.25);
        potential.add_ion_current(IonSelectivity::Chloride, -0.1);
        assert_eq!(potential.sodium_current, 0.75);
        assert_eq!(potential.chloride_current, -0.1);

        potential.add_contribution("nav", 0.2);
        potential.add_contribution("nav", 0.3);
        assert_eq!(potential.contribution("nav"), 0.5);
        assert_eq!(potential.contribution("missing"), 0.0);
    }

    #[test]
    fn test_snapshot_voltage() {
        let snapshot = MembraneSnapshot {
            accumulator: 1.5,
            ..MembraneSnapshot::default()
        };
        assert_eq!(snapshot.membrane_voltage(), -55.0);
    }
}

//! Configuration surfaces for channels and integration modes.
//!
//! Every config derives serde with `#[serde(default)]`, so a partial JSON/TOML
//! document fills the rest from biological defaults.

use crate::channel::{
    CalciumChannel, ChannelKind, ChannelTrigger, IonChannel, LigandGatedChlorideChannel,
    PotassiumChannel, SodiumChannel,
};
use crate::coincidence::CoincidenceDetectorConfig;
use crate::constants::{
    CALCIUM_BOOST_GAIN, CALCIUM_FACILITATION_BASELINE, CALCIUM_FACILITATION_RATE,
    CALCIUM_MAX_CONDUCTANCE, CALCIUM_REVERSAL, CHLORIDE_BOOST_GAIN, CHLORIDE_MAX_CONDUCTANCE,
    CHLORIDE_REVERSAL, DEFAULT_CALCIUM_SPIKE_BOOST, DEFAULT_DENDRITIC_SPIKE_THRESHOLD,
    DEFAULT_DENDRITIC_VOLTAGE_THRESHOLD, DEFAULT_MAX_SYNAPTIC_EFFECT, DEFAULT_MEMBRANE_NOISE,
    DEFAULT_MEMBRANE_TAU, DEFAULT_NMDA_SPIKE_AMPLITUDE, DEFAULT_SHUNTING_STRENGTH,
    DEFAULT_SPATIAL_DECAY_FACTOR, DEFAULT_TEMPORAL_JITTER, GRANULE_MEMBRANE_TAU,
    INTERNEURON_MEMBRANE_TAU, POTASSIUM_ADAPTATION_BASELINE, POTASSIUM_ADAPTATION_RATE,
    POTASSIUM_ATTENUATION_GAIN, POTASSIUM_MAX_CONDUCTANCE, POTASSIUM_REVERSAL,
    PURKINJE_MEMBRANE_TAU, PYRAMIDAL_MEMBRANE_TAU, RESTING_POTENTIAL, SHUNTING_FLOOR,
    SODIUM_BOOST_GAIN, SODIUM_MAX_CONDUCTANCE, SODIUM_REVERSAL, SODIUM_USE_DEPENDENCE_FLOOR,
    SODIUM_USE_DEPENDENCE_RATE, STELLATE_MEMBRANE_TAU,
};
use crate::error::{
    ensure_finite, ensure_fraction, ensure_non_negative, ensure_positive, ensure_time_constant,
    DendriticError,
};
use crate::integration::{
    ActiveDendriteMode, BiologicalTemporalSummationMode, DendriticIntegrationMode,
    PassiveMembraneMode, ShuntingInhibitionMode, TemporalSummationMode,
};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Biophysical parameters of one channel instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel family
    pub kind: ChannelKind,
    /// Instance name (key of per-channel contributions)
    pub name: String,
    /// Maximum conductance (nS)
    pub max_conductance: f64,
    /// Reversal potential (mV)
    pub reversal_potential: f64,
    /// Voltage the gates start at steady state for (mV)
    pub initial_voltage: f64,
    /// Gating parameters
    pub trigger: ChannelTrigger,
    /// Fraction of remaining headroom moved per use-dependent event
    pub modulation_rate: f64,
    /// Floor (Nav) or resting baseline (Kv, Cav) of the use-dependent factor
    pub modulation_bound: f64,
    /// Gain applied to signals passing through the channel
    pub signal_gain: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::sodium()
    }
}

impl ChannelConfig {
    /// Dendritic Nav
    pub fn sodium() -> Self {
        Self {
            kind: ChannelKind::Sodium,
            name: "nav".to_string(),
            max_conductance: SODIUM_MAX_CONDUCTANCE,
            reversal_potential: SODIUM_REVERSAL,
            initial_voltage: RESTING_POTENTIAL,
            trigger: ChannelTrigger::sodium(),
            modulation_rate: SODIUM_USE_DEPENDENCE_RATE,
            modulation_bound: SODIUM_USE_DEPENDENCE_FLOOR,
            signal_gain: SODIUM_BOOST_GAIN,
        }
    }

    /// Delayed-rectifier Kv
    pub fn potassium() -> Self {
        Self {
            kind: ChannelKind::Potassium,
            name: "kv".to_string(),
            max_conductance: POTASSIUM_MAX_CONDUCTANCE,
            reversal_potential: POTASSIUM_REVERSAL,
            initial_voltage: RESTING_POTENTIAL,
            trigger: ChannelTrigger::potassium(),
            modulation_rate: POTASSIUM_ADAPTATION_RATE,
            modulation_bound: POTASSIUM_ADAPTATION_BASELINE,
            signal_gain: POTASSIUM_ATTENUATION_GAIN,
        }
    }

    /// High-voltage-activated Cav
    pub fn calcium() -> Self {
        Self {
            kind: ChannelKind::Calcium,
            name: "cav".to_string(),
            max_conductance: CALCIUM_MAX_CONDUCTANCE,
            reversal_potential: CALCIUM_REVERSAL,
            initial_voltage: RESTING_POTENTIAL,
            trigger: ChannelTrigger::calcium(),
            modulation_rate: CALCIUM_FACILITATION_RATE,
            modulation_bound: CALCIUM_FACILITATION_BASELINE,
            signal_gain: CALCIUM_BOOST_GAIN,
        }
    }

    /// GABA-A chloride
    pub fn chloride() -> Self {
        Self {
            kind: ChannelKind::Chloride,
            name: "gaba_a".to_string(),
            max_conductance: CHLORIDE_MAX_CONDUCTANCE,
            reversal_potential: CHLORIDE_REVERSAL,
            initial_voltage: RESTING_POTENTIAL,
            trigger: ChannelTrigger::chloride(),
            modulation_rate: 0.0,
            modulation_bound: 1.0,
            signal_gain: CHLORIDE_BOOST_GAIN,
        }
    }

    /// Rename the instance
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DendriticError::InvalidParameter {
                name: "name",
                reason: "channel name must not be empty".to_string(),
            });
        }
        if !self.max_conductance.is_finite() || self.max_conductance < 0.0 {
            return Err(DendriticError::InvalidConductance {
                name: "max_conductance",
                value: self.max_conductance,
            });
        }
        ensure_finite("reversal_potential", self.reversal_potential)?;
        ensure_finite("initial_voltage", self.initial_voltage)?;
        ensure_fraction("modulation_rate", self.modulation_rate)?;
        ensure_fraction("modulation_bound", self.modulation_bound)?;
        ensure_non_negative("signal_gain", self.signal_gain)?;
        self.trigger.validate()
    }

    /// Validate and construct the channel
    pub fn build(&self) -> Result<Box<dyn IonChannel>> {
        self.validate()?;
        let channel: Box<dyn IonChannel> = match self.kind {
            ChannelKind::Sodium => Box::new(SodiumChannel::new(self)),
            ChannelKind::Potassium => Box::new(PotassiumChannel::new(self)),
            ChannelKind::Calcium => Box::new(CalciumChannel::new(self)),
            ChannelKind::Chloride => Box::new(LigandGatedChlorideChannel::new(self)),
        };
        Ok(channel)
    }
}

// ---------------------------------------------------------------------------
// Temporal integration
// ---------------------------------------------------------------------------

/// Cell classes with characteristic membrane time constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// Cortical pyramidal neuron (~20ms)
    Pyramidal,
    /// Fast-spiking interneuron (~8ms)
    FastSpikingInterneuron,
    /// Cerebellar Purkinje cell (~35ms)
    Purkinje,
    /// Cerebellar granule cell (~10ms)
    Granule,
    /// Spiny stellate cell (~15ms)
    SpinyStellate,
}

impl CellType {
    /// Characteristic membrane time constant
    pub fn membrane_time_constant(self) -> Duration {
        match self {
            CellType::Pyramidal => PYRAMIDAL_MEMBRANE_TAU,
            CellType::FastSpikingInterneuron => INTERNEURON_MEMBRANE_TAU,
            CellType::Purkinje => PURKINJE_MEMBRANE_TAU,
            CellType::Granule => GRANULE_MEMBRANE_TAU,
            CellType::SpinyStellate => STELLATE_MEMBRANE_TAU,
        }
    }
}

/// Passive membrane parameters shared by the decaying integration modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiologicalConfig {
    /// Default decay time constant τ = Rm·Cm
    pub membrane_time_constant: Duration,
    /// Resting potential (mV), used before the first snapshot arrives
    pub resting_potential: f64,
    /// Per-branch τ overrides, keyed by source id or location name
    pub branch_time_constants: HashMap<String, Duration>,
    /// Multiplier on location weights
    pub spatial_decay_factor: f64,
    /// Membrane noise amplitude (0 disables noise)
    pub membrane_noise: f64,
    /// Standard deviation of arrival-time jitter (zero disables jitter)
    pub temporal_jitter: Duration,
}

impl Default for BiologicalConfig {
    fn default() -> Self {
        Self {
            membrane_time_constant: DEFAULT_MEMBRANE_TAU,
            resting_potential: RESTING_POTENTIAL,
            branch_time_constants: HashMap::new(),
            spatial_decay_factor: DEFAULT_SPATIAL_DECAY_FACTOR,
            membrane_noise: DEFAULT_MEMBRANE_NOISE,
            temporal_jitter: DEFAULT_TEMPORAL_JITTER,
        }
    }
}

impl BiologicalConfig {
    /// Defaults with the membrane τ of a cell class
    pub fn for_cell_type(cell_type: CellType) -> Self {
        Self {
            membrane_time_constant: cell_type.membrane_time_constant(),
            ..Self::default()
        }
    }

    /// Disable membrane noise and arrival jitter
    pub fn without_noise(mut self) -> Self {
        self.membrane_noise = 0.0;
        self.temporal_jitter = Duration::ZERO;
        self
    }

    /// Override the membrane time constant
    pub fn with_membrane_time_constant(mut self, tau: Duration) -> Self {
        self.membrane_time_constant = tau;
        self
    }

    /// Add a per-branch time constant
    pub fn with_branch_time_constant(mut self, branch: impl Into<String>, tau: Duration) -> Self {
        self.branch_time_constants.insert(branch.into(), tau);
        self
    }

    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        ensure_time_constant("membrane_time_constant", self.membrane_time_constant)?;
        for tau in self.branch_time_constants.values() {
            ensure_time_constant("branch_time_constants", *tau)?;
        }
        ensure_finite("resting_potential", self.resting_potential)?;
        ensure_positive("spatial_decay_factor", self.spatial_decay_factor)?;
        ensure_non_negative("membrane_noise", self.membrane_noise)?;
        if self.spatial_decay_factor > 1.0 {
            warn!(
                factor = self.spatial_decay_factor,
                "spatial_decay_factor > 1.0; spatial weights will be clamped to 1.0"
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shunting and active dendrites
// ---------------------------------------------------------------------------

/// Divisive inhibition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuntingConfig {
    /// Shunt per unit of inhibition
    pub strength: f64,
    /// Lowest shunt factor
    pub floor: f64,
}

impl Default for ShuntingConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_SHUNTING_STRENGTH,
            floor: SHUNTING_FLOOR,
        }
    }
}

impl ShuntingConfig {
    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("shunting_strength", self.strength)?;
        ensure_fraction("shunting_floor", self.floor)?;
        ensure_positive("shunting_floor", self.floor)
    }
}

/// Active dendrite parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveDendriteConfig {
    /// Saturation of a single input's contribution
    pub max_synaptic_effect: f64,
    /// Shunt per unit of inhibition
    pub shunting_strength: f64,
    /// Lowest shunt factor
    pub shunting_floor: f64,
    /// Net current triggering a fallback dendritic spike
    pub dendritic_spike_threshold: f64,
    /// Current added by a fallback NMDA spike
    pub nmda_spike_amplitude: f64,
    /// Calcium current added by a fallback NMDA spike
    pub calcium_spike_boost: f64,
    /// Somatic accumulator level required for a fallback spike
    pub voltage_threshold: f64,
    /// Detector built at construction (fallback rule when absent)
    pub coincidence_detector: Option<CoincidenceDetectorConfig>,
}

impl Default for ActiveDendriteConfig {
    fn default() -> Self {
        Self {
            max_synaptic_effect: DEFAULT_MAX_SYNAPTIC_EFFECT,
            shunting_strength: DEFAULT_SHUNTING_STRENGTH,
            shunting_floor: SHUNTING_FLOOR,
            dendritic_spike_threshold: DEFAULT_DENDRITIC_SPIKE_THRESHOLD,
            nmda_spike_amplitude: DEFAULT_NMDA_SPIKE_AMPLITUDE,
            calcium_spike_boost: DEFAULT_CALCIUM_SPIKE_BOOST,
            voltage_threshold: DEFAULT_DENDRITIC_VOLTAGE_THRESHOLD,
            coincidence_detector: None,
        }
    }
}

impl ActiveDendriteConfig {
    /// Shunting parameters of this config
    pub fn shunting(&self) -> ShuntingConfig {
        ShuntingConfig {
            strength: self.shunting_strength,
            floor: self.shunting_floor,
        }
    }

    /// Check every parameter
    pub fn validate(&self) -> Result<()> {
        ensure_positive("max_synaptic_effect", self.max_synaptic_effect)?;
        self.shunting().validate()?;
        ensure_finite("dendritic_spike_threshold", self.dendritic_spike_threshold)?;
        ensure_non_negative("nmda_spike_amplitude", self.nmda_spike_amplitude)?;
        ensure_non_negative("calcium_spike_boost", self.calcium_spike_boost)?;
        ensure_finite("voltage_threshold", self.voltage_threshold)?;
        if let Some(detector) = &self.coincidence_detector {
            detector.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mode selection
// ---------------------------------------------------------------------------

/// Integration strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    /// Immediate pass-through
    Passive,
    /// Undecayed linear summation
    TemporalSummation,
    /// Exponential decay with spatial weighting and noise
    #[default]
    BiologicalTemporalSummation,
    /// Decay plus divisive inhibition
    ShuntingInhibition,
    /// Decay, saturation, shunting and dendritic spikes
    ActiveDendrite,
}

/// Complete integration setup of one neuron.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Strategy to build
    pub mode: ModeKind,
    /// Passive membrane parameters
    pub biological: BiologicalConfig,
    /// Used by [`ModeKind::ShuntingInhibition`]
    pub shunting: ShuntingConfig,
    /// Used by [`ModeKind::ActiveDendrite`]
    pub active: ActiveDendriteConfig,
    /// Channel chain, in signal order
    pub channels: Vec<ChannelConfig>,
}

impl IntegrationConfig {
    /// Validate and build the configured strategy with its channel chain
    pub fn build(&self) -> Result<Box<dyn DendriticIntegrationMode>> {
        let channels = self
            .channels
            .iter()
            .map(ChannelConfig::build)
            .collect::<Result<Vec<_>>>()?;

        let mode: Box<dyn DendriticIntegrationMode> = match self.mode {
            ModeKind::Passive => {
                if !channels.is_empty() {
                    warn!(
                        count = channels.len(),
                        "passive membrane ignores configured channels"
                    );
                    for mut channel in channels {
                        channel.close();
                    }
                }
                Box::new(PassiveMembraneMode::new())
            }
            ModeKind::TemporalSummation => {
                let mode = TemporalSummationMode::new();
                mode.set_channels(channels);
                Box::new(mode)
            }
            ModeKind::BiologicalTemporalSummation => {
                let mode = BiologicalTemporalSummationMode::new(self.biological.clone())?;
                mode.set_channels(channels);
                Box::new(mode)
            }
            ModeKind::ShuntingInhibition => {
                let mode = ShuntingInhibitionMode::new(self.biological.clone(), self.shunting)?;
                mode.set_channels(channels);
                Box::new(mode)
            }
            ModeKind::ActiveDendrite => {
                let mode = ActiveDendriteMode::new(self.biological.clone(), self.active.clone())?;
                mode.set_channels(channels);
                Box::new(mode)
            }
        };
        Ok(mode)
    }
}

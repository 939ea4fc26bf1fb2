//! Biological constants used across channels, detectors and integration modes.
//!
//! Voltages are in millivolts, concentrations in millimolar, conductances in
//! nanosiemens and currents in the crate's normalized current units (the
//! same units as [`SynapticSignal::value`](crate::types::SynapticSignal)).

use std::time::Duration;

// ---------------------------------------------------------------------------
// Membrane
// ---------------------------------------------------------------------------

/// Typical resting membrane potential (mV)
pub const RESTING_POTENTIAL: f64 = -70.0;

/// Millivolts of depolarization represented by one accumulator unit
pub const MILLIVOLTS_PER_ACCUMULATOR_UNIT: f64 = 10.0;

/// Default membrane time constant (pyramidal cell)
pub const DEFAULT_MEMBRANE_TAU: Duration = Duration::from_millis(20);

/// Fast-spiking interneuron membrane time constant
pub const INTERNEURON_MEMBRANE_TAU: Duration = Duration::from_millis(8);

/// Cortical pyramidal cell membrane time constant
pub const PYRAMIDAL_MEMBRANE_TAU: Duration = Duration::from_millis(20);

/// Cerebellar Purkinje cell membrane time constant
pub const PURKINJE_MEMBRANE_TAU: Duration = Duration::from_millis(35);

/// Cerebellar granule cell membrane time constant
pub const GRANULE_MEMBRANE_TAU: Duration = Duration::from_millis(10);

/// Spiny stellate cell membrane time constant
pub const STELLATE_MEMBRANE_TAU: Duration = Duration::from_millis(15);

// ---------------------------------------------------------------------------
// Current bounds
// ---------------------------------------------------------------------------

/// Upper bound of the net current delivered to the soma
pub const MAX_NET_CURRENT: f64 = 100.0;

/// Lower bound of the net current delivered to the soma
pub const MIN_NET_CURRENT: f64 = -100.0;

/// Results with a magnitude below this are reported as no effect
pub const NOISE_FLOOR: f64 = 0.001;

/// Conversion from `g × (E_rev − V)` (nS·mV) to current units
pub const CONDUCTANCE_TO_CURRENT: f64 = 0.001;

// ---------------------------------------------------------------------------
// Spatial weighting
// ---------------------------------------------------------------------------

/// Weight of inputs arriving on proximal dendrites
pub const PROXIMAL_WEIGHT: f64 = 1.0;

/// Weight of inputs arriving on basal dendrites
pub const BASAL_WEIGHT: f64 = 0.8;

/// Weight of inputs arriving on the apical tuft
pub const APICAL_WEIGHT: f64 = 0.7;

/// Weight of inputs arriving on distal dendrites
pub const DISTAL_WEIGHT: f64 = 0.5;

/// Default spatial decay multiplier
pub const DEFAULT_SPATIAL_DECAY_FACTOR: f64 = 1.0;

// ---------------------------------------------------------------------------
// Temporal integration
// ---------------------------------------------------------------------------

/// When a tick runs within this gap of the newest input, ages are measured
/// from that input rather than from the tick
pub const PROCESSING_JITTER_WINDOW: Duration = Duration::from_millis(5);

/// Inputs older than this many time constants (e^-5 ≈ 0.7% residual) are
/// dropped from a tick
pub const DECAY_CUTOFF_TIME_CONSTANTS: u32 = 5;

/// Default membrane noise amplitude (current units)
pub const DEFAULT_MEMBRANE_NOISE: f64 = 0.005;

/// Default standard deviation of arrival-time jitter
pub const DEFAULT_TEMPORAL_JITTER: Duration = Duration::from_micros(100);

/// LCG multiplier used to advance the noise seed
pub const LCG_MULTIPLIER: u64 = 1_103_515_245;

/// LCG increment used to advance the noise seed
pub const LCG_INCREMENT: u64 = 12_345;

/// LCG modulus (2^31)
pub const LCG_MODULUS: u64 = 1 << 31;

// ---------------------------------------------------------------------------
// Shunting and active dendrites
// ---------------------------------------------------------------------------

/// Default divisive inhibition strength
pub const DEFAULT_SHUNTING_STRENGTH: f64 = 0.5;

/// Minimum shunt factor: inhibition never fully silences excitation
pub const SHUNTING_FLOOR: f64 = 0.1;

/// Default per-input saturation limit in active dendrites
pub const DEFAULT_MAX_SYNAPTIC_EFFECT: f64 = 2.0;

/// Default net current needed for a fallback dendritic spike
pub const DEFAULT_DENDRITIC_SPIKE_THRESHOLD: f64 = 1.5;

/// Current added by a fallback NMDA spike
pub const DEFAULT_NMDA_SPIKE_AMPLITUDE: f64 = 2.0;

/// Calcium current added by a fallback NMDA spike
pub const DEFAULT_CALCIUM_SPIKE_BOOST: f64 = 0.5;

/// Somatic accumulator level required for a fallback dendritic spike
pub const DEFAULT_DENDRITIC_VOLTAGE_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// Reversal potentials (mV)
// ---------------------------------------------------------------------------

/// Sodium reversal potential
pub const SODIUM_REVERSAL: f64 = 50.0;

/// Potassium reversal potential
pub const POTASSIUM_REVERSAL: f64 = -90.0;

/// Calcium reversal potential
pub const CALCIUM_REVERSAL: f64 = 120.0;

/// Chloride reversal potential
pub const CHLORIDE_REVERSAL: f64 = -70.0;

// ---------------------------------------------------------------------------
// Maximum conductances (nS)
// ---------------------------------------------------------------------------

/// Dendritic Nav maximum conductance
pub const SODIUM_MAX_CONDUCTANCE: f64 = 120.0;

/// Dendritic Kv maximum conductance
pub const POTASSIUM_MAX_CONDUCTANCE: f64 = 36.0;

/// Dendritic Cav maximum conductance
pub const CALCIUM_MAX_CONDUCTANCE: f64 = 10.0;

/// GABA-A maximum conductance
pub const CHLORIDE_MAX_CONDUCTANCE: f64 = 20.0;

// ---------------------------------------------------------------------------
// Gating
// ---------------------------------------------------------------------------

/// Nav half-activation voltage
pub const SODIUM_ACTIVATION_V_HALF: f64 = -40.0;

/// Nav half-inactivation voltage
pub const SODIUM_INACTIVATION_V_HALF: f64 = -65.0;

/// Nav Boltzmann slope factor
pub const SODIUM_SLOPE: f64 = 6.0;

/// Kv half-activation voltage
pub const POTASSIUM_ACTIVATION_V_HALF: f64 = -35.0;

/// Kv Boltzmann slope factor
pub const POTASSIUM_SLOPE: f64 = 8.0;

/// Cav half-activation voltage
pub const CALCIUM_ACTIVATION_V_HALF: f64 = -25.0;

/// Cav Boltzmann slope factor
pub const CALCIUM_SLOPE: f64 = 5.0;

/// Intracellular calcium giving half-maximal calcium-dependent inactivation (mM)
pub const CALCIUM_CDI_HALF: f64 = 0.001;

/// GABA concentration (signal units) giving half-maximal activation
pub const GABA_EC50: f64 = 0.5;

/// GABA-A Hill coefficient
pub const GABA_HILL_COEFFICIENT: f64 = 2.0;

/// Maximum fraction of GABA-A receptors that desensitize
pub const GABA_MAX_DESENSITIZATION: f64 = 0.8;

/// GABA-A open fraction above which excitatory signals are shunted away
pub const GABA_SHUNT_BLOCK_FRACTION: f64 = 0.6;

/// Open probability at which a channel is reported open
pub const OPEN_PROBABILITY_THRESHOLD: f64 = 0.5;

/// Integration step applied when a signal passes through a channel
pub const CHANNEL_STEP: Duration = Duration::from_millis(1);

// ---------------------------------------------------------------------------
// Channel time constants
// ---------------------------------------------------------------------------

/// Nav activation
pub const SODIUM_ACTIVATION_TAU: Duration = Duration::from_micros(500);
/// Nav deactivation
pub const SODIUM_DEACTIVATION_TAU: Duration = Duration::from_millis(1);
/// Nav inactivation
pub const SODIUM_INACTIVATION_TAU: Duration = Duration::from_millis(5);
/// Nav recovery from inactivation
pub const SODIUM_RECOVERY_TAU: Duration = Duration::from_millis(10);

/// Kv activation
pub const POTASSIUM_ACTIVATION_TAU: Duration = Duration::from_millis(5);
/// Kv deactivation
pub const POTASSIUM_DEACTIVATION_TAU: Duration = Duration::from_millis(10);
/// Kv slow inactivation (adaptation decay)
pub const POTASSIUM_INACTIVATION_TAU: Duration = Duration::from_millis(500);
/// Kv recovery
pub const POTASSIUM_RECOVERY_TAU: Duration = Duration::from_millis(1000);

/// Cav activation
pub const CALCIUM_ACTIVATION_TAU: Duration = Duration::from_millis(1);
/// Cav deactivation
pub const CALCIUM_DEACTIVATION_TAU: Duration = Duration::from_millis(2);
/// Cav inactivation
pub const CALCIUM_INACTIVATION_TAU: Duration = Duration::from_millis(50);
/// Cav recovery (facilitation decay)
pub const CALCIUM_RECOVERY_TAU: Duration = Duration::from_millis(100);

/// GABA-A activation
pub const GABA_ACTIVATION_TAU: Duration = Duration::from_millis(2);
/// GABA-A deactivation
pub const GABA_DEACTIVATION_TAU: Duration = Duration::from_millis(20);
/// GABA-A desensitization
pub const GABA_DESENSITIZATION_TAU: Duration = Duration::from_millis(100);
/// GABA-A recovery from desensitization
pub const GABA_RECOVERY_TAU: Duration = Duration::from_millis(200);

// ---------------------------------------------------------------------------
// Use-dependent modulation
// ---------------------------------------------------------------------------

/// Fraction of remaining Nav availability lost per firing contribution
pub const SODIUM_USE_DEPENDENCE_RATE: f64 = 0.05;
/// Lowest Nav availability under use-dependent inactivation
pub const SODIUM_USE_DEPENDENCE_FLOOR: f64 = 0.3;

/// Fraction of remaining Kv headroom gained per firing contribution
pub const POTASSIUM_ADAPTATION_RATE: f64 = 0.04;
/// Resting Kv availability before spike-frequency adaptation
pub const POTASSIUM_ADAPTATION_BASELINE: f64 = 0.6;

/// Fraction of remaining Cav headroom gained per unit calcium influx
pub const CALCIUM_FACILITATION_RATE: f64 = 0.1;
/// Resting Cav availability before facilitation
pub const CALCIUM_FACILITATION_BASELINE: f64 = 0.5;

/// Upper bound of a single facilitation/adaptation step
pub const MAX_MODULATION_STEP: f64 = 0.9;

/// Gain of the Nav boost applied to passing EPSPs
pub const SODIUM_BOOST_GAIN: f64 = 0.5;
/// Fraction of an EPSP shunted away by fully open Kv
pub const POTASSIUM_ATTENUATION_GAIN: f64 = 0.5;
/// Gain of the Cav boost applied to passing EPSPs
pub const CALCIUM_BOOST_GAIN: f64 = 0.3;
/// Fraction of GABA-A receptors already open that scales IPSP enhancement
pub const CHLORIDE_BOOST_GAIN: f64 = 0.2;

// ---------------------------------------------------------------------------
// Coincidence detection
// ---------------------------------------------------------------------------

/// Extracellular magnesium concentration (mM)
pub const MAGNESIUM_CONCENTRATION: f64 = 1.0;

/// Jahr-Stevens Mg²⁺ dissociation constant (mM)
pub const MG_BLOCK_DISSOCIATION: f64 = 3.57;

/// Jahr-Stevens voltage sensitivity (1/mV)
pub const MG_BLOCK_VOLTAGE_SENSITIVITY: f64 = 0.062;

/// Depolarization delivered to dendrites by a back-propagating spike (mV)
pub const BACK_PROPAGATING_SPIKE_DEPOLARIZATION: f64 = 20.0;

/// NMDA coincidence window
pub const NMDA_COINCIDENCE_WINDOW: Duration = Duration::from_millis(20);

/// Voltage the dendrite must reach for NMDA unblocking (mV)
pub const NMDA_VOLTAGE_THRESHOLD: f64 = -50.0;

/// Glutamatergic inputs required within the NMDA window
pub const NMDA_MIN_COINCIDENT_INPUTS: usize = 3;

/// Peak NMDA amplification factor
pub const NMDA_AMPLIFICATION: f64 = 2.0;

/// NMDA current per coincident input at full unblock
pub const NMDA_CURRENT_PER_INPUT: f64 = 0.5;

/// NMDA calcium influx per coincident input at full unblock
pub const NMDA_CALCIUM_PER_INPUT: f64 = 0.1;

/// Simple temporal coincidence window
pub const TEMPORAL_COINCIDENCE_WINDOW: Duration = Duration::from_millis(10);

/// Inputs required within the simple temporal window
pub const TEMPORAL_MIN_INPUTS: usize = 3;

/// Simple temporal detector amplification
pub const TEMPORAL_AMPLIFICATION: f64 = 1.5;

/// Simple temporal detector extra current
pub const TEMPORAL_ADDITIONAL_CURRENT: f64 = 0.5;

/// Simple temporal detector calcium influx
pub const TEMPORAL_CALCIUM_INFLUX: f64 = 0.05;

// ---------------------------------------------------------------------------
// Intracellular ion concentrations (mM)
// ---------------------------------------------------------------------------

/// Resting intracellular calcium (100 nM)
pub const RESTING_CALCIUM: f64 = 0.0001;

/// Resting intracellular sodium
pub const RESTING_SODIUM: f64 = 12.0;

/// Resting intracellular potassium
pub const RESTING_POTASSIUM: f64 = 140.0;

//! Voltage- and ligand-gated membrane channels
//!
//! Each channel family owns its gating variables and use-dependent state:
//!
//! - **Sodium** (Nav): conductance ∝ m³h, use-dependent inactivation
//! - **Potassium** (Kv): conductance ∝ n⁴, spike-frequency adaptation
//! - **Calcium** (Cav): conductance ∝ m², calcium-driven facilitation and
//!   calcium-dependent inactivation
//! - **Chloride** (GABA-A): Hill activation in ligand concentration with slow
//!   desensitization, independent of voltage
//!
//! Channels never fail. A channel vetoes a signal by returning a
//! [`ChannelModulation`] with `proceed == false`; a closed gate reports an open
//! probability of exactly zero.

mod calcium;
mod chloride;
pub mod gating;
mod potassium;
mod sodium;

pub use calcium::CalciumChannel;
pub use chloride::LigandGatedChlorideChannel;
pub use potassium::PotassiumChannel;
pub use sodium::SodiumChannel;

use crate::constants::{
    CALCIUM_ACTIVATION_TAU, CALCIUM_ACTIVATION_V_HALF, CALCIUM_DEACTIVATION_TAU,
    CALCIUM_INACTIVATION_TAU, CALCIUM_RECOVERY_TAU, CALCIUM_SLOPE, CONDUCTANCE_TO_CURRENT,
    GABA_ACTIVATION_TAU, GABA_DEACTIVATION_TAU, GABA_DESENSITIZATION_TAU, GABA_EC50,
    GABA_HILL_COEFFICIENT, GABA_RECOVERY_TAU, POTASSIUM_ACTIVATION_TAU,
    POTASSIUM_ACTIVATION_V_HALF, POTASSIUM_DEACTIVATION_TAU, POTASSIUM_INACTIVATION_TAU,
    POTASSIUM_RECOVERY_TAU, POTASSIUM_SLOPE, RESTING_CALCIUM, SODIUM_ACTIVATION_TAU,
    SODIUM_ACTIVATION_V_HALF, SODIUM_DEACTIVATION_TAU, SODIUM_INACTIVATION_TAU,
    SODIUM_INACTIVATION_V_HALF, SODIUM_RECOVERY_TAU, SODIUM_SLOPE,
};
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, ensure_time_constant};
use crate::types::{IonSelectivity, SynapticSignal};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Channel family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Voltage-gated sodium
    #[default]
    Sodium,
    /// Delayed-rectifier potassium
    Potassium,
    /// High-voltage-activated calcium
    Calcium,
    /// GABA-A ligand-gated chloride
    Chloride,
}

impl ChannelKind {
    /// Ion conducted by this family
    pub fn ion(self) -> IonSelectivity {
        match self {
            ChannelKind::Sodium => IonSelectivity::Sodium,
            ChannelKind::Potassium => IonSelectivity::Potassium,
            ChannelKind::Calcium => IonSelectivity::Calcium,
            ChannelKind::Chloride => IonSelectivity::Chloride,
        }
    }
}

/// Conformation snapshot of a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    /// Open probability is above the family's open threshold
    pub is_open: bool,
    /// Effective conductance, within `[0, g_max]` (nS)
    pub conductance: f64,
    /// Voltage at the last update (mV)
    pub membrane_voltage: f64,
    /// Intracellular calcium at the last update (mM)
    pub calcium_level: f64,
    /// When the channel last transitioned to open
    pub opened_at: Option<Instant>,
    /// When the channel last entered inactivation
    pub inactivated_at: Option<Instant>,
}

/// Immutable gating parameters of one channel instance.
///
/// Families without a voltage-dependent inactivation gate ignore
/// `inactivation_voltage`; voltage-independent families ignore the voltage
/// fields altogether.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelTrigger {
    /// Half-activation voltage (mV)
    pub activation_voltage: f64,
    /// Half-inactivation voltage (mV)
    pub inactivation_voltage: f64,
    /// Boltzmann slope factor (mV)
    pub voltage_slope: f64,
    /// Ligand concentration giving half-maximal activation
    pub ligand_threshold: f64,
    /// Hill coefficient for ligand binding
    pub hill_coefficient: f64,
    /// Opening time constant
    pub activation_tau: Duration,
    /// Closing time constant
    pub deactivation_tau: Duration,
    /// Inactivation/desensitization time constant
    pub inactivation_tau: Duration,
    /// Recovery time constant
    pub recovery_tau: Duration,
}

impl Default for ChannelTrigger {
    fn default() -> Self {
        Self::sodium()
    }
}

impl ChannelTrigger {
    /// Dendritic Nav parameters
    pub fn sodium() -> Self {
        Self {
            activation_voltage: SODIUM_ACTIVATION_V_HALF,
            inactivation_voltage: SODIUM_INACTIVATION_V_HALF,
            voltage_slope: SODIUM_SLOPE,
            ligand_threshold: 0.0,
            hill_coefficient: 1.0,
            activation_tau: SODIUM_ACTIVATION_TAU,
            deactivation_tau: SODIUM_DEACTIVATION_TAU,
            inactivation_tau: SODIUM_INACTIVATION_TAU,
            recovery_tau: SODIUM_RECOVERY_TAU,
        }
    }

    /// Delayed-rectifier Kv parameters
    pub fn potassium() -> Self {
        Self {
            activation_voltage: POTASSIUM_ACTIVATION_V_HALF,
            inactivation_voltage: 0.0,
            voltage_slope: POTASSIUM_SLOPE,
            ligand_threshold: 0.0,
            hill_coefficient: 1.0,
            activation_tau: POTASSIUM_ACTIVATION_TAU,
            deactivation_tau: POTASSIUM_DEACTIVATION_TAU,
            inactivation_tau: POTASSIUM_INACTIVATION_TAU,
            recovery_tau: POTASSIUM_RECOVERY_TAU,
        }
    }

    /// High-voltage-activated Cav parameters
    pub fn calcium() -> Self {
        Self {
            activation_voltage: CALCIUM_ACTIVATION_V_HALF,
            inactivation_voltage: 0.0,
            voltage_slope: CALCIUM_SLOPE,
            ligand_threshold: 0.0,
            hill_coefficient: 1.0,
            activation_tau: CALCIUM_ACTIVATION_TAU,
            deactivation_tau: CALCIUM_DEACTIVATION_TAU,
            inactivation_tau: CALCIUM_INACTIVATION_TAU,
            recovery_tau: CALCIUM_RECOVERY_TAU,
        }
    }

    /// GABA-A parameters
    pub fn chloride() -> Self {
        Self {
            activation_voltage: 0.0,
            inactivation_voltage: 0.0,
            voltage_slope: 1.0,
            ligand_threshold: GABA_EC50,
            hill_coefficient: GABA_HILL_COEFFICIENT,
            activation_tau: GABA_ACTIVATION_TAU,
            deactivation_tau: GABA_DEACTIVATION_TAU,
            inactivation_tau: GABA_DESENSITIZATION_TAU,
            recovery_tau: GABA_RECOVERY_TAU,
        }
    }

    /// Check slopes, ligand parameters and time constants
    pub fn validate(&self) -> Result<()> {
        ensure_finite("activation_voltage", self.activation_voltage)?;
        ensure_finite("inactivation_voltage", self.inactivation_voltage)?;
        ensure_positive("voltage_slope", self.voltage_slope)?;
        ensure_non_negative("ligand_threshold", self.ligand_threshold)?;
        ensure_positive("hill_coefficient", self.hill_coefficient)?;
        ensure_time_constant("activation_tau", self.activation_tau)?;
        ensure_time_constant("deactivation_tau", self.deactivation_tau)?;
        ensure_time_constant("inactivation_tau", self.inactivation_tau)?;
        ensure_time_constant("recovery_tau", self.recovery_tau)?;
        Ok(())
    }
}

/// One-shot message driving use-dependent modulation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelFeedback {
    /// The channel's current contributed to a somatic spike
    pub contributed_to_firing: bool,
    /// Calcium influx associated with the event (normalized, ≥ 0)
    pub calcium_influx: f64,
    /// CaMKII activity proxy in `[0, 1]`
    pub camkii_activity: f64,
    /// PKC activity proxy in `[0, 1]`
    pub pkc_activity: f64,
}

/// Outcome of [`IonChannel::should_open`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatingDecision {
    /// Open probability crossed the family's open threshold
    pub open: bool,
    /// Expected dwell time in the open state (zero when closed)
    pub expected_open_duration: Duration,
    /// Open probability in `[0, 1]`
    pub probability: f64,
}

/// Steady-state gate values at a voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSteadyState {
    /// Activation gate (non-decreasing in voltage)
    pub activation: f64,
    /// Inactivation gate (non-increasing in voltage; 1.0 when absent)
    pub inactivation: f64,
}

/// Outcome of [`IonChannel::modulate_current`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelModulation {
    /// Replacement signal; `None` with `proceed` set means unchanged
    pub signal: Option<SynapticSignal>,
    /// `false` blocks the signal: no later channel runs and it is not buffered
    pub proceed: bool,
    /// Current produced by the channel (positive depolarizes)
    pub current: f64,
}

impl ChannelModulation {
    /// Let a modified signal through
    pub fn pass(signal: SynapticSignal, current: f64) -> Self {
        Self {
            signal: Some(signal),
            proceed: true,
            current,
        }
    }

    /// Let the signal through untouched
    pub fn unchanged(current: f64) -> Self {
        Self {
            signal: None,
            proceed: true,
            current,
        }
    }

    /// Block the signal
    pub fn block(current: f64) -> Self {
        Self {
            signal: None,
            proceed: false,
            current,
        }
    }
}

/// A stateful membrane channel.
///
/// Channels are exclusively owned by one integration mode, which serializes
/// access; `&mut self` methods are never called concurrently.
pub trait IonChannel: Send + fmt::Debug {
    /// Instance name, used as the key in per-channel contributions
    fn name(&self) -> &str;

    /// Channel family
    fn kind(&self) -> ChannelKind;

    /// Run a signal through the channel at the given membrane voltage (mV)
    /// and intracellular calcium (mM)
    fn modulate_current(
        &mut self,
        signal: &SynapticSignal,
        voltage: f64,
        calcium: f64,
    ) -> ChannelModulation;

    /// Advance gating by `dt` and report whether the channel opens
    fn should_open(
        &mut self,
        voltage: f64,
        ligand_concentration: f64,
        calcium: f64,
        dt: Duration,
    ) -> GatingDecision;

    /// Apply use-dependent modulation from firing feedback
    fn update_kinetics(&mut self, feedback: &ChannelFeedback, dt: Duration, voltage: f64);

    /// Steady-state gate values at `voltage`
    fn steady_state(&self, voltage: f64) -> GateSteadyState;

    /// Conformation snapshot
    fn state(&self) -> ChannelState;

    /// Gating parameters
    fn trigger(&self) -> &ChannelTrigger;

    /// Effective conductance in `[0, g_max]` (nS)
    fn conductance(&self) -> f64;

    /// Reversal potential (mV)
    fn reversal_potential(&self) -> f64;

    /// Conducted ion
    fn ion_selectivity(&self) -> IonSelectivity;

    /// Release channel state; the channel must not be used afterwards
    fn close(&mut self);

    /// Whether [`close`](IonChannel::close) has been called
    fn is_closed(&self) -> bool;
}

/// State common to all channel families.
#[derive(Debug, Clone)]
pub(crate) struct ChannelCore {
    pub name: String,
    pub trigger: ChannelTrigger,
    pub max_conductance: f64,
    pub reversal_potential: f64,
    pub state: ChannelState,
    pub closed: bool,
}

impl ChannelCore {
    pub fn new(
        name: String,
        trigger: ChannelTrigger,
        max_conductance: f64,
        reversal_potential: f64,
        voltage: f64,
    ) -> Self {
        Self {
            name,
            trigger,
            max_conductance,
            reversal_potential,
            state: ChannelState {
                is_open: false,
                conductance: 0.0,
                membrane_voltage: voltage,
                calcium_level: RESTING_CALCIUM,
                opened_at: None,
                inactivated_at: None,
            },
            closed: false,
        }
    }

    /// Conductance for an open probability, kept within `[0, g_max]`
    pub fn conductance_for(&self, probability: f64) -> f64 {
        (self.max_conductance * probability).clamp(0.0, self.max_conductance)
    }

    /// Driving-force current `g·(E_rev − V)` in current units
    pub fn driving_current(&self, conductance: f64, voltage: f64) -> f64 {
        conductance * (self.reversal_potential - voltage) * CONDUCTANCE_TO_CURRENT
    }

    /// Record a gating update, stamping open transitions
    pub fn record(&mut self, conductance: f64, voltage: f64, calcium: f64, open: bool) {
        if open && !self.state.is_open {
            self.state.opened_at = Some(Instant::now());
        }
        self.state.is_open = open;
        self.state.conductance = conductance;
        self.state.membrane_voltage = voltage;
        self.state.calcium_level = calcium;
    }

    /// Stamp the moment an inactivation gate closes past half
    pub fn record_inactivation(&mut self, was_available: bool, is_available: bool) {
        if was_available && !is_available {
            self.state.inactivated_at = Some(Instant::now());
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.state.is_open = false;
        self.state.conductance = 0.0;
    }
}

/// Build a gating decision from an open probability
pub(crate) fn decide(probability: f64, threshold: f64, closing_tau: Duration) -> GatingDecision {
    let probability = probability.clamp(0.0, 1.0);
    let open = probability > 0.0 && probability >= threshold;
    GatingDecision {
        open,
        expected_open_duration: if open { closing_tau } else { Duration::ZERO },
        probability,
    }
}

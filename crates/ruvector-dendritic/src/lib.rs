//! # RuVector Dendritic
//!
//! Dendritic signal integration for spiking neurons: how synaptic input
//! arriving on a dendritic tree is combined over time and space before it
//! reaches the soma.
//!
//! - Voltage- and ligand-gated ion channels (Nav, Kv, Cav, GABA-A) with
//!   first-order gating kinetics and use-dependent modulation
//! - Five integration strategies, from pass-through to active dendrites with
//!   shunting inhibition and NMDA-like dendritic spikes
//! - Coincidence detectors with Mg²⁺ block and temporal windows
//!
//! ## Integration
//!
//! A neuron owns one [`DendriticIntegrationMode`]. The message-delivery path
//! calls `handle` for every synaptic signal; the neuron's tick calls `process`
//! with a [`MembraneSnapshot`] and folds the returned [`IntegratedPotential`]
//! into its accumulator.
//!
//! ### Example
//!
//! ```rust
//! use ruvector_dendritic::config::{BiologicalConfig, IntegrationConfig, ModeKind};
//! use ruvector_dendritic::{DendriticIntegrationMode, MembraneSnapshot, SynapticSignal};
//! use std::time::{Duration, Instant};
//!
//! let config = IntegrationConfig {
//!     mode: ModeKind::BiologicalTemporalSummation,
//!     biological: BiologicalConfig::default().without_noise(),
//!     ..IntegrationConfig::default()
//! };
//! let mode = config.build()?;
//!
//! // One EPSP on a proximal branch, read out one membrane time constant later
//! let t0 = Instant::now();
//! mode.handle_at(SynapticSignal::new("proximal", 1.0), t0);
//! let potential = mode
//!     .process_at(&MembraneSnapshot::default(), t0 + Duration::from_millis(20))
//!     .unwrap();
//! assert!((potential.net_current - 0.368).abs() < 0.01);
//! # Ok::<(), ruvector_dendritic::DendriticError>(())
//! ```
//!
//! ## Channels
//!
//! ```rust
//! use ruvector_dendritic::config::ChannelConfig;
//! use ruvector_dendritic::SynapticSignal;
//! use std::time::Duration;
//!
//! let mut nav = ChannelConfig::sodium().build()?;
//! let decision = nav.should_open(0.0, 0.0, 0.0001, Duration::from_millis(1));
//! assert!(decision.open);
//!
//! let boosted = nav.modulate_current(&SynapticSignal::new("basal", 1.0), -30.0, 0.0001);
//! assert!(boosted.proceed);
//! # Ok::<(), ruvector_dendritic::DendriticError>(())
//! ```

pub mod channel;
pub mod coincidence;
pub mod config;
pub mod constants;
pub mod error;
pub mod integration;
pub mod types;

pub use channel::{
    CalciumChannel, ChannelFeedback, ChannelKind, ChannelModulation, ChannelState, ChannelTrigger,
    GateSteadyState, GatingDecision, IonChannel, LigandGatedChlorideChannel, PotassiumChannel,
    SodiumChannel,
};
pub use coincidence::{
    CoincidenceDetector, CoincidenceDetectorConfig, CoincidenceResult, NmdaCoincidenceDetector,
    TemporalCoincidenceDetector,
};
pub use config::{
    ActiveDendriteConfig, BiologicalConfig, CellType, ChannelConfig, IntegrationConfig, ModeKind,
    ShuntingConfig,
};
pub use error::{DendriticError, Result};
pub use integration::{
    ActiveDendriteMode, BiologicalTemporalSummationMode, DendriticIntegrationMode,
    PassiveMembraneMode, ShuntingInhibitionMode, TemporalSummationMode,
};
pub use types::{
    ChannelCurrent, DendriticLocation, IntegratedPotential, IonSelectivity, MembraneSnapshot,
    Neurotransmitter, SynapticSignal, TimestampedInput,
};

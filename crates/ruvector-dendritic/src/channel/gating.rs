//! Gating primitives shared by every channel family.
//!
//! ```text
//! activation:    x∞(V) = 1 / (1 + e^((V½ − V)/k))
//! inactivation:  x∞(V) = 1 / (1 + e^((V − V½)/k))
//! ligand:        x∞(L) = Lⁿ / (EC50ⁿ + Lⁿ)
//! relaxation:    x(t+Δt) = x∞ + (x(t) − x∞)·e^(−Δt/τ)
//! ```

use std::time::Duration;

/// Steady-state activation: sigmoid increasing in voltage
#[inline]
pub fn boltzmann_activation(voltage: f64, v_half: f64, slope: f64) -> f64 {
    1.0 / (1.0 + ((v_half - voltage) / slope).exp())
}

/// Steady-state inactivation: sigmoid decreasing in voltage
#[inline]
pub fn boltzmann_inactivation(voltage: f64, v_half: f64, slope: f64) -> f64 {
    1.0 / (1.0 + ((voltage - v_half) / slope).exp())
}

/// Hill equation for ligand binding
#[inline]
pub fn hill(concentration: f64, ec50: f64, coefficient: f64) -> f64 {
    if concentration <= 0.0 {
        return 0.0;
    }
    let c = concentration.powf(coefficient);
    c / (ec50.powf(coefficient) + c)
}

/// First-order relaxation of `current` toward `steady` over `dt`
#[inline]
pub fn relax(current: f64, steady: f64, dt: Duration, tau: Duration) -> f64 {
    if tau.is_zero() {
        return steady;
    }
    let decay = (-dt.as_secs_f64() / tau.as_secs_f64()).exp();
    steady + (current - steady) * decay
}

/// A dimensionless gating variable in `[0, 1]`.
///
/// Uses separate time constants for opening and closing moves, e.g.
/// activation/deactivation or recovery/inactivation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    value: f64,
}

impl Gate {
    /// Gate initialized at `value` (clamped into `[0, 1]`)
    pub fn at(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
        }
    }

    /// Current value
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Relax toward `steady`, using `tau_rise` when opening and `tau_fall` when closing
    pub fn relax_toward(
        &mut self,
        steady: f64,
        dt: Duration,
        tau_rise: Duration,
        tau_fall: Duration,
    ) {
        let tau = if steady >= self.value { tau_rise } else { tau_fall };
        self.value = relax(self.value, steady, dt, tau).clamp(0.0, 1.0);
    }
}

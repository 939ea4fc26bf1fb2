//! Delivery threads and the neuron tick running at the same time.

mod common;

use approx::assert_abs_diff_eq;
use common::quiet;
use ruvector_dendritic::{
    ActiveDendriteConfig, ActiveDendriteMode, DendriticIntegrationMode, MembraneSnapshot,
    SynapticSignal, TemporalSummationMode,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

const SENDERS: usize = 8;
const SIGNALS_PER_SENDER: usize = 1000;

#[test]
fn test_concurrent_delivery_loses_nothing() {
    let mode = TemporalSummationMode::new();
    let finished = AtomicUsize::new(0);
    let snapshot = MembraneSnapshot::default();

    let mut total = 0.0;
    thread::scope(|scope| {
        for sender in 0..SENDERS {
            let (mode, finished) = (&mode, &finished);
            scope.spawn(move || {
                for _ in 0..SIGNALS_PER_SENDER {
                    mode.handle(SynapticSignal::new(format!("sender-{sender}"), 0.01));
                }
                finished.fetch_add(1, Ordering::Release);
            });
        }

        while finished.load(Ordering::Acquire) < SENDERS {
            if let Some(potential) = mode.process(&snapshot) {
                total += potential.net_current;
            }
            thread::yield_now();
        }
    });
    if let Some(potential) = mode.process(&snapshot) {
        total += potential.net_current;
    }

    assert_eq!(mode.pending_inputs(), 0);
    assert_abs_diff_eq!(total, (SENDERS * SIGNALS_PER_SENDER) as f64 * 0.01, epsilon = 1e-6);
}

#[test]
fn test_concurrent_delivery_into_active_dendrite() {
    let mode = ActiveDendriteMode::new(quiet(), ActiveDendriteConfig::default()).unwrap();
    let snapshot = MembraneSnapshot::default();

    thread::scope(|scope| {
        for _ in 0..SENDERS {
            let mode = &mode;
            scope.spawn(move || {
                for i in 0..SIGNALS_PER_SENDER {
                    let value = if i % 4 == 0 { -0.2 } else { 0.3 };
                    mode.handle(SynapticSignal::new("basal", value));
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..200 {
                if let Some(potential) = mode.process(&snapshot) {
                    assert!(potential.net_current.is_finite());
                    assert!(potential.net_current.abs() <= 100.0);
                }
                thread::yield_now();
            }
        });
    });

    mode.process(&snapshot);
    assert_eq!(mode.pending_inputs(), 0);
}

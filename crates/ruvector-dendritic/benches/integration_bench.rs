use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ruvector_dendritic::{
    ActiveDendriteConfig, ActiveDendriteMode, BiologicalConfig, BiologicalTemporalSummationMode,
    ChannelConfig, CoincidenceDetectorConfig, DendriticIntegrationMode, MembraneSnapshot,
    SynapticSignal,
};
use std::time::Instant;

const SOURCES: [&str; 4] = ["proximal", "basal", "apical", "distal"];

fn deliver_and_tick(
    mode: &dyn DendriticIntegrationMode,
    batch: usize,
    snapshot: &MembraneSnapshot,
) {
    let now = Instant::now();
    for i in 0..batch {
        mode.handle_at(SynapticSignal::new(SOURCES[i % 4], 0.3), now);
    }
    black_box(mode.process_at(snapshot, now));
}

fn bench_biological_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("biological_tick");
    let snapshot = MembraneSnapshot::default();

    for batch in [1, 16, 256].iter() {
        group.throughput(Throughput::Elements(*batch as u64));

        let mode = BiologicalTemporalSummationMode::new(BiologicalConfig::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("no_channels", batch), batch, |b, &batch| {
            b.iter(|| deliver_and_tick(&mode, batch, &snapshot));
        });

        let mode = BiologicalTemporalSummationMode::new(BiologicalConfig::default()).unwrap();
        mode.set_channels(vec![
            ChannelConfig::sodium().build().unwrap(),
            ChannelConfig::potassium().build().unwrap(),
        ]);
        group.bench_with_input(BenchmarkId::new("nav_kv", batch), batch, |b, &batch| {
            b.iter(|| deliver_and_tick(&mode, batch, &snapshot));
        });
    }

    group.finish();
}

fn bench_active_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("active_tick");
    let snapshot = MembraneSnapshot {
        accumulator: 0.6,
        ..MembraneSnapshot::default()
    };

    for batch in [16, 256].iter() {
        group.throughput(Throughput::Elements(*batch as u64));

        let mode =
            ActiveDendriteMode::new(BiologicalConfig::default(), ActiveDendriteConfig::default())
                .unwrap();
        group.bench_with_input(BenchmarkId::new("fallback", batch), batch, |b, &batch| {
            b.iter(|| deliver_and_tick(&mode, batch, &snapshot));
        });

        let config = ActiveDendriteConfig {
            coincidence_detector: Some(CoincidenceDetectorConfig::default()),
            ..ActiveDendriteConfig::default()
        };
        let mode = ActiveDendriteMode::new(BiologicalConfig::default(), config).unwrap();
        group.bench_with_input(BenchmarkId::new("nmda", batch), batch, |b, &batch| {
            b.iter(|| deliver_and_tick(&mode, batch, &snapshot));
        });
    }

    group.finish();
}

fn bench_channel_modulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_modulation");
    let signal = SynapticSignal::new("basal", 0.5);

    for config in [
        ChannelConfig::sodium(),
        ChannelConfig::potassium(),
        ChannelConfig::calcium(),
        ChannelConfig::chloride(),
    ] {
        let mut channel = config.build().unwrap();
        group.bench_function(config.name.as_str(), |b| {
            b.iter(|| channel.modulate_current(black_box(&signal), black_box(-55.0), 0.0001));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_biological_tick,
    bench_active_tick,
    bench_channel_modulation
);
criterion_main!(benches);

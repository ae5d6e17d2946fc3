//! Formatter and frame-loop benchmarks.

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scrubline_core::{
    format_time, AttachOptions, ClipSet, ClipSpec, ControlsConfig, ManualClock,
    PlaybackController, TimeFormat,
};

fn bench_format_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_time");
    for format in [
        TimeFormat::MinutesSecondsCentiseconds,
        TimeFormat::SecondsCentiseconds,
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(format.name()), &format, |b, &fmt| {
            b.iter(|| format_time(black_box(3599.995), fmt))
        });
    }
    group.finish();
}

fn bench_advance(c: &mut Criterion) {
    let subject = Rc::new(ClipSet::new([
        ClipSpec::new("Walk", 10.0, 2),
        ClipSpec::new("Run", 15.0, 3),
    ]));

    for (label, config) in [
        ("with_view", ControlsConfig::default()),
        ("headless", ControlsConfig::headless()),
    ] {
        let mut controller =
            PlaybackController::with_clock(config, Box::new(ManualClock::new()));
        if controller
            .attach(subject.clone(), AttachOptions::playing())
            .is_err()
        {
            return;
        }
        c.bench_function(&format!("advance_{label}"), |b| {
            b.iter(|| controller.advance(black_box(1.0 / 60.0)))
        });
    }
}

criterion_group!(benches, bench_format_time, bench_advance);
criterion_main!(benches);

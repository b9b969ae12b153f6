use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

use pasat_core::{Millis, TrialState};
use pasat_experiment::{DigitGenerator, DrillConfig, DrillEvent, InputEvent, SilentPlayer, TrialScheduler};
use pasat_timing::{ManualTimer, Timer};
use rand::rngs::StdRng;
use rand::SeedableRng;

type Drill = TrialScheduler<ManualTimer, StdRng, SilentPlayer>;

fn harness(minutes: u64) -> (Drill, ManualTimer) {
    let clock = ManualTimer::new();
    let config = DrillConfig {
        session_duration_seconds: minutes * 60,
        ..Default::default()
    };
    let mut drill = TrialScheduler::new(config, clock.clone(), StdRng::seed_from_u64(5), SilentPlayer)
        .unwrap_or_else(|e| panic!("bench config rejected: {e}"));
    drill.start().unwrap_or_else(|e| panic!("start failed: {e}"));
    (drill, clock)
}

/// Expected answer of the trial whose window is currently open
fn open_expected(drill: &Drill) -> Option<u32> {
    let session = drill.session()?;
    let flight = session.in_flight()?;
    if !matches!(flight.state, TrialState::WindowOpen { .. }) {
        return None;
    }
    session.trials().iter().rev().find(|t| t.trial_id == flight.trial_id)?.expected_answer
}

/// Jumps from wakeup to wakeup, answering every open window 700ms in.
/// Returns the number of events produced.
fn run_session(drill: &mut Drill, clock: &ManualTimer) -> usize {
    let mut produced = 0;
    let mut answer_at: Option<Millis> = None;
    loop {
        let next = match (drill.next_deadline(), answer_at) {
            (Some(d), Some(a)) => d.min(a),
            (Some(d), None) => d,
            (None, _) => break,
        };
        clock.set(next);

        if answer_at.is_some_and(|a| a <= next) {
            answer_at = None;
            if let Some(expected) = open_expected(drill) {
                produced += drill.handle_input(InputEvent::Buffer(expected.to_string())).len();
            }
        }
        for event in drill.update() {
            if matches!(event, DrillEvent::WindowOpened { .. }) {
                answer_at = Some(clock.now() + 700);
            }
            produced += 1;
        }
    }
    produced
}

pub fn bench_full_session(c: &mut Criterion) {
    let mut g = c.benchmark_group("session");
    g.sample_size(30).measurement_time(Duration::from_secs(10));

    g.bench_function("five_minutes_all_correct", |b| {
        b.iter_batched(
            || harness(5),
            |(mut drill, clock)| black_box(run_session(&mut drill, &clock)),
            BatchSize::SmallInput,
        );
    });

    g.bench_function("twenty_minutes_all_correct", |b| {
        b.iter_batched(
            || harness(20),
            |(mut drill, clock)| black_box(run_session(&mut drill, &clock)),
            BatchSize::SmallInput,
        );
    });
    g.finish();
}

pub fn bench_generator(c: &mut Criterion) {
    let generator = DigitGenerator::default();
    c.bench_function("digit_generator_1000", |b| {
        b.iter_batched(
            || StdRng::seed_from_u64(1),
            |mut rng| {
                let mut history = Vec::with_capacity(1000);
                for _ in 0..1000 {
                    let digit = generator.next(&mut rng, &history);
                    history.push(digit);
                }
                black_box(history)
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_full_session, bench_generator);
criterion_main!(benches);

use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use propman::{
    MachineBuilder, MultiEvent, MultiEventFactory, MultiEventFunction, MultiMonitor,
    PropositionalMachine,
};

const VARS: [&str; 4] = ["a", "b", "c", "d"];

/// A counter over `a`, with `b` resetting it. Reaching the last state is a violation.
fn counting_machine(factory: &MultiEventFactory, states: u32) -> PropositionalMachine {
    let step = factory.read_from_formula("a & !b").unwrap();
    let reset = factory.read_from_formula("b").unwrap();
    let mut builder = MachineBuilder::new();
    for s in 0..states - 1 {
        builder = builder
            .when(s, step.clone(), MultiEventFunction::epsilon(), s + 1)
            .when(s, reset.clone(), MultiEventFunction::Identity, 0)
            .otherwise(s, MultiEventFunction::epsilon(), s);
    }
    builder
        .otherwise(states - 1, MultiEventFunction::empty(), states - 1)
        .build()
        .unwrap()
}

fn bench_concrete_step(c: &mut Criterion) {
    let factory = MultiEventFactory::new(VARS);
    let event = factory.read_from_valuations("TF??,TFT?,FT??,FFFF,?F?F,TTTT");

    let mut group = c.benchmark_group("lifting");
    group.throughput(Throughput::Elements(1));
    group.bench_function("concrete_step_8_states", |b| {
        b.iter_custom(|iters| {
            // Fresh monitor per sample so path counts do not grow across samples.
            let mut monitor = MultiMonitor::new(counting_machine(&factory, 8)).unwrap();
            let start = Instant::now();
            for _ in 0..iters {
                black_box(monitor.push(&event).unwrap());
            }
            start.elapsed()
        });
    });
    group.finish();
}

fn bench_symbolic_step(c: &mut Criterion) {
    let factory = MultiEventFactory::new(VARS);
    let event = factory.read_from_formula("(a | c) & !d").unwrap();

    c.bench_function("lifting/symbolic_step_8_states", |b| {
        b.iter_custom(|iters| {
            let mut monitor = MultiMonitor::new(counting_machine(&factory, 8)).unwrap();
            let start = Instant::now();
            for _ in 0..iters {
                black_box(monitor.push(&event).unwrap());
            }
            start.elapsed()
        });
    });
}

fn bench_intersection(c: &mut Criterion) {
    let factory = MultiEventFactory::new(VARS);
    let left = MultiEvent::concrete_all(VARS);
    let right = factory.read_from_formula("a -> (b | !c)").unwrap();

    c.bench_function("multi_event/intersection_81x_formula", |b| {
        b.iter(|| black_box(left.intersection(black_box(&right))));
    });
}

criterion_group!(benches, bench_concrete_step, bench_symbolic_step, bench_intersection);
criterion_main!(benches);

mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tran::interpreter::Interpreter;

fn bench_interpreter(c: &mut Criterion) {
    for (label, path) in common::workloads() {
        let program = common::load_program(&path);

        c.bench_function(&format!("interpreter_total_{label}"), |b| {
            let interpreter = Interpreter::new();
            b.iter(|| {
                let output = interpreter
                    .prepare(black_box(&program))
                    .expect("prepare")
                    .start()
                    .expect("run");
                black_box(output);
            })
        });

        c.bench_function(&format!("interpreter_start_only_{label}"), |b| {
            let prepared = Interpreter::new().prepare(&program).expect("prepare");
            b.iter(|| {
                let output = prepared.start().expect("run");
                black_box(output);
            })
        });
    }
}

criterion_group!(benches, bench_interpreter);
criterion_main!(benches);

//! Benchmark suite for the translate-then-execute pipeline
//!
//! Compares translation cost, native execution and the reference
//! interpreter on the same programs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tapejit_core::jit::native_supported;
use tapejit_core::{Config, Executor, Interpreter, RecordingIo, Translator};

/// Nested counting loops: roughly 256^2 inner iterations
const COUNTER: &str = "-[>-[>+<-]<-]";

const HELLO: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    let translator = Translator::new();

    for repeat in [1usize, 16, 256] {
        let source = HELLO.repeat(repeat);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &source, |b, source| {
            b.iter(|| black_box(translator.translate(source).unwrap()));
        });
    }

    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    let config = Config::default();

    for (name, source) in [("hello", HELLO), ("counter", COUNTER)] {
        group.bench_with_input(BenchmarkId::new("interpreter", name), source, |b, source| {
            let interpreter = Interpreter::new(&config);
            b.iter(|| {
                let mut io = RecordingIo::new();
                black_box(interpreter.run_source(source, &mut io).unwrap());
            });
        });

        if native_supported() {
            group.bench_with_input(BenchmarkId::new("jit", name), source, |b, source| {
                let executor = Executor::new(&config);
                b.iter(|| {
                    let code = Translator::new().translate(source).unwrap();
                    let mut io = RecordingIo::new();
                    executor.execute(&code, &mut io).unwrap();
                    black_box(io.output);
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_translate, bench_execute);
criterion_main!(benches);

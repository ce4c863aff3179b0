use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evalexpr::{build_operator_tree, DefaultNumericTypes};
use omnicalc::ast::{Compiler, Executor};
use omnicalc::format::format_number;
use omnicalc::{AngleUnit, Domain, Engine, EvaluationConfig, SampleGenerator};
use std::collections::HashMap;
use std::sync::Arc;

/// Benchmark simple arithmetic expressions
fn benchmark_simple_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simple arithmetic Expression Evaluation");

    let engine = Engine::new();
    let config = EvaluationConfig::default();

    let expr = "2 + 3 * 4";
    let ast = engine.parse(expr).unwrap().unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("exact_arithmetic", |b| {
        b.iter(|| engine.evaluate(black_box(expr), &config).unwrap())
    });

    group.bench_function("preparsed_exact_arithmetic", |b| {
        b.iter(|| {
            engine
                .evaluate_ast(black_box(&ast), &config, &HashMap::new())
                .unwrap()
        })
    });

    group.bench_function("native_rust_arithmetic", |b| {
        b.iter(|| black_box(2.0 + 3.0 * 4.0))
    });

    group.bench_function("meval_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark nested expressions with functions and constants
fn benchmark_scientific(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scientific Expression Evaluation");

    let engine = Engine::new();
    let config = EvaluationConfig::default();

    let expr = "sqrt(2) * sin(pi / 4) + ln(10) ^ 2 - 5!";
    let meval_expr = "sqrt(2) * sin(pi / 4) + ln(10) ^ 2 - 120";
    let program = Compiler::compile(
        &engine.parse(expr).unwrap().unwrap(),
        engine.registry(),
        "x",
    )
    .unwrap();
    let mut executor = Executor::new(AngleUnit::Radians);

    group.bench_function("exact_scientific", |b| {
        b.iter(|| engine.evaluate(black_box(expr), &config).unwrap())
    });

    group.bench_function("compiled_f64_scientific", |b| {
        b.iter(|| executor.execute(black_box(&program), 0.0).unwrap())
    });

    group.bench_function("meval_scientific", |b| {
        b.iter(|| meval::eval_str(black_box(meval_expr)).unwrap())
    });
}

/// Benchmark significant-digit formatting
fn benchmark_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("Result Formatting");

    let engine = Engine::new();
    let config = EvaluationConfig::default();
    let third = engine.evaluate("1/3", &config).unwrap();
    let third = third.value().unwrap().clone();
    let large = engine.evaluate("2^200", &config).unwrap();
    let large = large.value().unwrap().clone();

    group.bench_function("format_repeating", |b| {
        b.iter(|| format_number(black_box(&third), &config))
    });

    group.bench_function("format_large", |b| {
        b.iter(|| format_number(black_box(&large), &config))
    });
}

/// Benchmark plot sampling
fn benchmark_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Plot Sampling");

    let engine = Engine::new();
    let generator = SampleGenerator::new(Arc::clone(engine.registry()));
    let config = EvaluationConfig::default();

    group.bench_function("sample_1000_points", |b| {
        b.iter(|| {
            generator.generate(
                black_box("sin(x) * x^2 / (1 + abs(x))"),
                Domain::default(),
                1000,
                &config,
            )
        })
    });

    group.bench_function("meval_1000_points", |b| {
        let f = "sin(x) * x^2 / (1 + abs(x))"
            .parse::<meval::Expr>()
            .unwrap()
            .bind("x")
            .unwrap();
        b.iter(|| {
            (0..=1000)
                .map(|i| {
                    let x = -10.0 + 20.0 * i as f64 / 1000.0;
                    (x, f(x))
                })
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(
    benches,
    benchmark_simple_arithmetic,
    benchmark_scientific,
    benchmark_formatting,
    benchmark_sampling
);
criterion_main!(benches);

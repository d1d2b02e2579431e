/// Histogram parsing and evaluation benchmarks
///
/// Measures the per-poll cost: parsing both histograms and advancing the
/// trigger state, for histograms of increasing bucket count.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dmlatency::error::Result;
use dmlatency::latency::{parse_histogram, Environment, Evaluator, Unit};
use dmlatency::thresholds::Thresholds;

/// `buckets` ten-millisecond buckets with made-up counts
fn millis_histogram(buckets: u64) -> String {
    (0..buckets)
        .map(|i| format!("{}-{}(ms):{}\n", i * 10, i * 10 + 9, i * 37 + 5))
        .collect()
}

/// In-memory environment serving fixed histograms
struct StaticEnvironment {
    millis: String,
    seconds: String,
}

impl Environment for StaticEnvironment {
    fn default_thresholds(&self) -> Result<Thresholds> {
        Ok(Thresholds::new(20, 10))
    }

    fn validate_target(&self, _target: &str) -> Result<()> {
        Ok(())
    }

    fn read_histogram(&self, _target: &str, unit: Unit) -> Result<String> {
        Ok(match unit {
            Unit::Millis => self.millis.clone(),
            Unit::Seconds => self.seconds.clone(),
        })
    }
}

/// Benchmark: parse a millisecond histogram
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_histogram");

    for buckets in [8u64, 32, 100] {
        let text = millis_histogram(buckets);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(buckets), &text, |b, text| {
            b.iter(|| parse_histogram(black_box(text), Unit::Millis));
        });
    }

    group.finish();
}

/// Benchmark: one full evaluation call (both histograms + state update)
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for buckets in [8u64, 32, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(buckets),
            &buckets,
            |b, &buckets| {
                let mut evaluator = Evaluator::new(StaticEnvironment {
                    millis: millis_histogram(buckets),
                    seconds: "1-1(s):3\n2-2(s):1\n".to_string(),
                });
                b.iter(|| evaluator.evaluate(black_box("dm-0"), 20, 10));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_evaluate);
criterion_main!(benches);

//! Benchmark for filter parsing and matching
//!
//! Matching should stay allocation-free for map-backed events.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use trace_filter_core::event::{EventRecord, PayloadEvent, PayloadValue};
use trace_filter_core::query::{parse, ExpressionTree, TreeCache};

const EXPRESSIONS: [&str; 5] = [
    "Depth >= 2",
    "GC/Start::Depth >= 2 && Reason == AllocSmall",
    "(Depth >= 10) && (Depth <= 20) || Count > 1,000",
    "((((Depth >= 1) && (Depth <= 9)) || (Depth == 20)) && (Reason != Induced))",
    "ThreadData Contains 10 || GC/Start::Count > 0x100",
];

struct GcStart {
    names: Vec<String>,
    depth: u64,
    count: u64,
    reason: String,
}

impl PayloadEvent for GcStart {
    fn event_name(&self) -> &str {
        "GC/Start"
    }

    fn payload_names(&self) -> &[String] {
        &self.names
    }

    fn payload_value(&self, index: usize) -> Option<PayloadValue<'_>> {
        match index {
            0 => Some(PayloadValue::UInt(self.depth)),
            1 => Some(PayloadValue::UInt(self.count)),
            2 => Some(PayloadValue::Str(&self.reason)),
            _ => None,
        }
    }
}

/// Create a realistic mix of GC and thread events
fn create_events(n: usize) -> Vec<EventRecord> {
    (0..n)
        .map(|i| {
            if i % 3 == 0 {
                EventRecord::new("Thread/Start")
                    .with_property("ThreadID", (1000 + i).to_string())
                    .with_property("ThreadData", format!("{}", i * 7))
            } else {
                EventRecord::new("GC/Start")
                    .with_property("Depth", (i % 3).to_string())
                    .with_property("Count", (i * 13).to_string())
                    .with_property("Reason", if i % 2 == 0 { "AllocSmall" } else { "Induced" })
            }
        })
        .collect()
}

fn benchmark_parsing(c: &mut Criterion) {
    c.bench_function("expression_parsing_cold", |b| {
        b.iter(|| {
            for expr in &EXPRESSIONS {
                let _ = black_box(parse(expr));
            }
        })
    });

    c.bench_function("expression_parsing_cached", |b| {
        let cache = TreeCache::new();
        // Warm up cache
        for expr in &EXPRESSIONS {
            let _ = cache.get_or_build(expr);
        }

        b.iter(|| {
            for expr in &EXPRESSIONS {
                let _ = black_box(cache.get_or_build(expr));
            }
        })
    });
}

fn benchmark_matching(c: &mut Criterion) {
    let events = create_events(1_000);
    let trees: Vec<ExpressionTree> = EXPRESSIONS
        .iter()
        .map(|e| ExpressionTree::new(e).unwrap())
        .collect();

    c.bench_function("match_records_1k", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for tree in &trees {
                hits += tree.filter(&events).count();
            }
            black_box(hits)
        })
    });

    let maps: Vec<(String, HashMap<String, String>)> = events
        .iter()
        .map(|e| {
            let map = e
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            (e.name.clone(), map)
        })
        .collect();

    c.bench_function("match_maps_1k", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for tree in &trees {
                hits += maps
                    .iter()
                    .filter(|(name, props)| tree.matches_map(props, name))
                    .count();
            }
            black_box(hits)
        })
    });

    let typed: Vec<GcStart> = (0..1_000u64)
        .map(|i| GcStart {
            names: vec!["Depth".to_string(), "Count".to_string(), "Reason".to_string()],
            depth: i % 3,
            count: i * 13,
            reason: "AllocSmall".to_string(),
        })
        .collect();

    c.bench_function("match_typed_1k", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for tree in &trees {
                hits += typed.iter().filter(|e| tree.matches_event(*e)).count();
            }
            black_box(hits)
        })
    });
}

criterion_group!(benches, benchmark_parsing, benchmark_matching);
criterion_main!(benches);

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! BAC Analyzer - Performance Benchmarks
//! © 2026 Bountyy Oy
//!
//! Benchmarks for decision derivation, matrix validation and role comparison

use bac_analyzer::decision::{derive, ProbeStatus};
use bac_analyzer::observation::ObservationSet;
use bac_analyzer::types::{Endpoint, ExpectedDecision, ExpectedMatrix, HttpMethod, RoleRanking};
use bac_analyzer::{differential, matrix_validator};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const STATUSES: [u16; 8] = [200, 201, 204, 302, 401, 403, 404, 500];

fn ranking(roles: usize) -> RoleRanking {
    RoleRanking::new((0..roles).map(|i| format!("role{}", i)))
}

fn observations(endpoints: usize, roles: usize) -> (ObservationSet, ExpectedMatrix) {
    let catalog: Vec<Endpoint> = (0..endpoints)
        .map(|i| {
            let method = if i % 5 == 0 { HttpMethod::Delete } else { HttpMethod::Get };
            Endpoint::new(&format!("ep{}", i), method, &format!("http://lab/api/{}", i))
        })
        .collect();

    let mut set = ObservationSet::new(catalog, ranking(roles)).unwrap();
    let mut matrix = ExpectedMatrix::new();

    for e in 0..endpoints {
        for r in 0..roles {
            let role = format!("role{}", r);
            let endpoint = format!("ep{}", e);
            let status = STATUSES[(e * 7 + r * 3) % STATUSES.len()];
            set.record(&role, &endpoint, ProbeStatus::Code(status)).unwrap();

            let expected = if r <= e % roles {
                ExpectedDecision::Allow
            } else {
                ExpectedDecision::Deny
            };
            matrix.insert(&role, &endpoint, expected);
        }
    }

    (set, matrix)
}

fn benchmark_derive(c: &mut Criterion) {
    c.bench_function("derive_decision", |b| {
        b.iter(|| {
            for status in 100u16..600 {
                let _ = derive(black_box(ProbeStatus::Code(status)));
            }
            let _ = derive(black_box(ProbeStatus::Failed));
        })
    });
}

fn benchmark_matrix_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_validation");
    for endpoints in [10usize, 100, 1000] {
        let (set, matrix) = observations(endpoints, 4);
        group.bench_with_input(BenchmarkId::from_parameter(endpoints), &set, |b, set| {
            b.iter(|| matrix_validator::validate(black_box(set), black_box(&matrix)))
        });
    }
    group.finish();
}

fn benchmark_differential(c: &mut Criterion) {
    let mut group = c.benchmark_group("differential_analysis");
    for roles in [3usize, 6, 12] {
        let (set, _) = observations(200, roles);
        group.bench_with_input(BenchmarkId::from_parameter(roles), &set, |b, set| {
            b.iter(|| differential::analyze(black_box(set)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_derive,
    benchmark_matrix_validation,
    benchmark_differential
);
criterion_main!(benches);

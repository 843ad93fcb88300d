//! Solve-loop benchmarks.
//!
//! One mid-sized rig: a bank of sliders with in-betweens, a layer of
//! corrective combos, and a pair of floaters sharing a triangulated
//! space. The solve is what runs once per host evaluation tick.

use blendrig::Rig;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const SLIDERS: usize = 24;
const COMBOS: usize = 12;

fn build_definition() -> String {
    let mut shapes = vec!["{\"name\": \"rest\"}".to_owned()];
    let mut progs = Vec::new();
    let mut sliders = Vec::new();
    let mut combos = Vec::new();

    for i in 0..SLIDERS {
        let mid = shapes.len();
        shapes.push(format!("{{\"name\": \"slider{i}Mid\"}}"));
        let peak = shapes.len();
        shapes.push(format!("{{\"name\": \"slider{i}Peak\"}}"));
        progs.push(format!(
            "{{\"name\": \"sliderProg{i}\", \"pairs\": [[0, 0.0], [{mid}, 0.5], [{peak}, 1.0]], \"interp\": \"spline\"}}"
        ));
        sliders.push(format!("{{\"name\": \"slider{i}\", \"prog\": {i}}}"));
    }

    for i in 0..COMBOS {
        let shape = shapes.len();
        shapes.push(format!("{{\"name\": \"combo{i}\"}}"));
        let prog = progs.len();
        progs.push(format!(
            "{{\"name\": \"comboProg{i}\", \"pairs\": [[{shape}, 1.0]], \"interp\": \"linear\"}}"
        ));
        let a = (i * 2) % SLIDERS;
        let b = (i * 2 + 1) % SLIDERS;
        combos.push(format!(
            "{{\"name\": \"combo{i}\", \"prog\": {prog}, \"pairs\": [[{a}, 1.0], [{b}, 1.0]], \"solveType\": \"min\"}}"
        ));
    }

    // Two floaters sharing slider set and orthant: one triangulated space.
    for (i, (x, y)) in [(0.5, 0.5), (0.25, 0.75)].iter().enumerate() {
        let shape = shapes.len();
        shapes.push(format!("{{\"name\": \"floater{i}\"}}"));
        let prog = progs.len();
        progs.push(format!(
            "{{\"name\": \"floaterProg{i}\", \"pairs\": [[{shape}, 1.0]], \"interp\": \"linear\"}}"
        ));
        combos.push(format!(
            "{{\"name\": \"floater{i}\", \"prog\": {prog}, \"pairs\": [[0, {x}], [1, {y}]]}}"
        ));
    }

    format!(
        "{{\"encodingVersion\": 2, \"shapes\": [{}], \"progressions\": [{}], \"sliders\": [{}], \"combos\": [{}]}}",
        shapes.join(", "),
        progs.join(", "),
        sliders.join(", "),
        combos.join(", ")
    )
}

fn bench_solve(c: &mut Criterion) {
    let definition = build_definition();
    let mut rig = Rig::from_definition(&definition).expect("benchmark rig must parse");

    let input: Vec<f64> = (0..SLIDERS)
        .map(|i| (i as f64 * 0.37).sin().abs())
        .collect();

    let mut group = c.benchmark_group("solve");
    group.bench_function("mid_rig_tick", |b| {
        b.iter(|| rig.solve(black_box(&input)));
    });
    group.bench_function("neutral_tick", |b| {
        let zeros = vec![0.0; SLIDERS];
        b.iter(|| rig.solve(black_box(&zeros)));
    });
    group.finish();
}

fn bench_parse_and_build(c: &mut Criterion) {
    let definition = build_definition();
    c.bench_function("parse_and_build", |b| {
        b.iter(|| Rig::from_definition(black_box(&definition)).expect("must parse"));
    });
}

criterion_group!(benches, bench_solve, bench_parse_and_build);
criterion_main!(benches);

//! 目標函數與約束評估的效能基準
//!
//! ```bash
//! cargo bench --bench evaluation
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use blend::blend_calc::{BlendModel, ConstraintBuilder};
use blend::blend_optimizer::{LocalRefiner, ObjectiveMode, RefinerSettings};
use blend::{CompoundName, CompoundRow, InputData, MaterialRow};

const CONTENT_LABELS: [&str; 5] = ["TFe", "SiO2", "CaO", "Al2O3", "MgO"];

fn input(materials: usize) -> InputData {
    let rows = (0..materials)
        .map(|i| {
            let shift = i as f64;
            CONTENT_LABELS
                .iter()
                .enumerate()
                .fold(
                    MaterialRow::new(&format!("M{}", i), 500.0 + 10.0 * shift, 0.0, 100.0)
                        .with_content("H2O", 5.0 + (i % 4) as f64),
                    |row, (k, label)| {
                        let base = if k == 0 { 55.0 } else { 2.0 + k as f64 };
                        row.with_content(label, base + (shift * 0.37 + k as f64) % 5.0)
                    },
                )
        })
        .collect();
    let compounds = vec![
        CompoundRow::new("TFe", 50.0, 65.0),
        CompoundRow::new("SiO2", 2.0, 8.0),
        CompoundRow::new("CaO", 3.0, 9.0),
    ];
    InputData::from_rows(rows, compounds).expect("valid benchmark input")
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    for n in [4usize, 16, 64] {
        let input = input(n);
        let model = BlendModel::new(&input, CompoundName::TFe).expect("model");
        let constraints = ConstraintBuilder::build(&model);
        let x = vec![100.0 / n as f64; n];

        group.bench_with_input(BenchmarkId::new("cost", n), &x, |b, x| {
            b.iter(|| model.cost(black_box(x)))
        });
        group.bench_with_input(BenchmarkId::new("constraints", n), &x, |b, x| {
            b.iter(|| constraints.is_satisfied(&model, black_box(x), 1e-2))
        });
        group.bench_with_input(BenchmarkId::new("quantities", n), &x, |b, x| {
            b.iter(|| model.quantities(black_box(x)))
        });
    }

    group.finish();
}

fn bench_local_refine(c: &mut Criterion) {
    let input = input(8);
    let model = BlendModel::new(&input, CompoundName::TFe).expect("model");
    let constraints = ConstraintBuilder::build(&model);
    let refiner = LocalRefiner::new(
        &model,
        &constraints,
        ObjectiveMode::Cost,
        RefinerSettings::default(),
    );
    let x0 = vec![12.5; 8];

    c.bench_function("local_refine_8", |b| {
        b.iter(|| refiner.minimize(black_box(&x0)))
    });
}

criterion_group!(benches, bench_evaluation, bench_local_refine);
criterion_main!(benches);

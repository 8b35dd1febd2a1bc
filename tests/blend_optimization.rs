//! 集成測試

use blend::blend_calc::{BlendModel, ConstraintAuditor, ConstraintBuilder};
use blend::blend_optimizer::SearchStatus;
use blend::{
    BlendError, BlendOptimizer, CompoundName, CompoundRow, InputData, MaterialRow, SolverConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

/// 兩種礦：A 價 100、含水 10%、Fe 50%；B 價 120、含水 5%、Fe 60%
fn two_ore_input(fe_bounds: (f64, f64)) -> InputData {
    InputData::from_rows(
        vec![
            MaterialRow::new("A", 100.0, 30.0, 70.0)
                .with_content("TFe", 50.0)
                .with_content("H2O", 10.0),
            MaterialRow::new("B", 120.0, 30.0, 70.0)
                .with_content("TFe", 60.0)
                .with_content("H2O", 5.0),
        ],
        vec![CompoundRow::new("TFe", fe_bounds.0, fe_bounds.1)],
    )
    .unwrap()
}

fn sinter_input() -> InputData {
    InputData::from_rows(
        vec![
            MaterialRow::new("巴西粉", 780.0, 10.0, 50.0)
                .with_content("TFe", 65.0)
                .with_content("SiO2", 4.2)
                .with_content("CaO", 0.1)
                .with_content("H2O", 8.0),
            MaterialRow::new("澳洲粉", 700.0, 10.0, 50.0)
                .with_content("TFe", 61.5)
                .with_content("SiO2", 3.8)
                .with_content("Al2O3", 2.3)
                .with_content("H2O", 7.0),
            MaterialRow::new("國內精粉", 620.0, 5.0, 30.0)
                .with_content("TFe", 58.0)
                .with_content("SiO2", 8.0)
                .with_content("CaO", 1.0)
                .with_content("H2O", 10.0),
            MaterialRow::new("石灰石", 120.0, 5.0, 20.0)
                .with_content("CaO", 52.0)
                .with_content("SiO2", 1.5)
                .with_content("烧损", 42.0)
                .with_content("H2O", 2.0),
        ],
        vec![
            CompoundRow::new("TFe", 50.0, 60.0),
            CompoundRow::new("SiO2", 3.0, 6.0),
            CompoundRow::new("CaO", 5.0, 12.0),
        ],
    )
    .unwrap()
}

fn config() -> SolverConfig {
    SolverConfig::default()
        .with_max_iterations(60)
        .with_stagnation_limit(15)
}

#[test]
fn test_two_ore_scenario() {
    let input = two_ore_input((40.0, 80.0));
    let optimizer = BlendOptimizer::new(config().with_seed(2024)).unwrap();
    let result = optimizer.solve(&input).unwrap();

    assert!(result.success, "{}", result.message);
    assert!((result.ratios.sum() - 100.0).abs() < 1e-3);

    let a = result.ratios.get("A").unwrap();
    let b = result.ratios.get("B").unwrap();
    assert!((30.0 - 1e-3..=70.0 + 1e-3).contains(&a));
    assert!((30.0 - 1e-3..=70.0 + 1e-3).contains(&b));

    let fe = result.quantities.composition[&CompoundName::TFe];
    assert!((40.0..=80.0).contains(&fe), "Fe = {}", fe);

    // A 每噸鐵乾基成本較低，取上限
    assert!((a - 70.0).abs() < 1e-2, "A = {}", a);
    assert!(result.audit.is_clean(), "{:?}", result.audit.messages());
}

#[test]
fn test_sinter_blend_satisfies_all_bounds() {
    let input = sinter_input();
    let optimizer = BlendOptimizer::new(config().with_seed(7)).unwrap();
    let result = optimizer.solve(&input).unwrap();

    let model = BlendModel::new(&input, CompoundName::TFe).unwrap();
    let constraints = ConstraintBuilder::build(&model);
    let x = result.ratios.as_slice();

    assert!(constraints.is_satisfied(&model, x, 1e-2));
    assert!((result.ratios.sum() - 100.0).abs() < 1e-3);
    for compound in input.compounds() {
        let value = result.quantities.composition[&compound.name];
        assert!(
            value >= compound.low_bound - 1e-2 && value <= compound.up_bound + 1e-2,
            "{} = {}",
            compound.name,
            value
        );
    }
    assert!(result.objective > 0.0 && result.objective.is_finite());
}

#[rstest]
#[case(&[(60.0, 60.0), (60.0, 60.0)])]
#[case(&[(0.0, 40.0), (0.0, 40.0)])]
fn test_infeasible_ratio_bounds(#[case] bounds: &[(f64, f64)]) {
    let rows = bounds
        .iter()
        .enumerate()
        .map(|(i, &(low, high))| {
            MaterialRow::new(&format!("M{}", i), 100.0, low, high).with_content("TFe", 55.0)
        })
        .collect();
    let input = InputData::from_rows(rows, vec![CompoundRow::new("TFe", 40.0, 80.0)]).unwrap();

    let optimizer = BlendOptimizer::new(config().with_seed(1)).unwrap();
    let err = optimizer.solve(&input).unwrap_err();
    assert!(matches!(err, BlendError::Infeasible(_)), "{}", err);
}

#[test]
fn test_seeded_runs_are_identical() {
    let input = sinter_input();
    let optimizer = BlendOptimizer::new(config()).unwrap();

    let first = optimizer
        .solve_with_rng(&input, StdRng::seed_from_u64(99))
        .unwrap();
    let second = optimizer
        .solve_with_rng(&input, StdRng::seed_from_u64(99))
        .unwrap();

    assert_eq!(first.ratios, second.ratios);
    assert_eq!(first.objective, second.objective);
    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.pool.len(), second.pool.len());
    for (a, b) in first.pool.iter().zip(&second.pool) {
        assert_eq!(a.ratios, b.ratios);
        assert_eq!(a.objective, b.objective);
    }
}

#[test]
fn test_stagnation_halts_before_budget() {
    let input = two_ore_input((40.0, 80.0));
    let config = SolverConfig::default().with_seed(3).with_max_iterations(500);
    let result = BlendOptimizer::new(config).unwrap().solve(&input).unwrap();

    assert_eq!(result.status, SearchStatus::Stagnated);
    assert!(result.iterations < 500);
    assert!(result.iterations >= 50);
}

#[test]
fn test_unreachable_compound_window_is_reported() {
    // 兩礦 Fe 最高 57，下限 70 無法達到
    let input = two_ore_input((70.0, 80.0));
    let config = config().with_seed(5).with_max_iterations(10);
    let result = BlendOptimizer::new(config).unwrap().solve(&input).unwrap();

    assert!(!result.success);
    assert!(!result.audit.is_clean());
    let names: Vec<&str> = result
        .audit
        .violations
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert!(names.contains(&"cc_TFe_lower_bounds_constraint"));

    // 比例約束仍然成立
    assert!((result.ratios.sum() - 100.0).abs() < 1e-3);
}

#[test]
fn test_pool_entries_are_feasible_and_bounded() {
    let input = sinter_input();
    let config = SolverConfig::default()
        .with_seed(11)
        .with_max_iterations(80)
        .with_stagnation_limit(1000);
    let result = BlendOptimizer::new(config).unwrap().solve(&input).unwrap();

    assert!(result.pool.len() <= 3);
    let model = BlendModel::new(&input, CompoundName::TFe).unwrap();
    let constraints = ConstraintBuilder::build(&model);
    for entry in &result.pool {
        assert!(constraints.is_satisfied(&model, entry.ratios.as_slice(), 1e-2));
        assert!(entry.objective >= result.objective - 1e-6);
    }
}

#[test]
fn test_result_table_export() {
    let input = two_ore_input((40.0, 80.0));
    let result = BlendOptimizer::new(config().with_seed(8))
        .unwrap()
        .solve(&input)
        .unwrap();

    let table = result.to_table(4);
    assert_eq!(table.columns.len(), 1 + result.pool.len());
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.objective_row().values.len(), table.columns.len());

    let ratios = table.ratio_results();
    assert_eq!(ratios.len(), 2);
    assert_eq!(ratios[0].0, "A");
    assert_eq!(ratios[1].0, "B");

    let json = table.to_json().unwrap();
    assert!(json.contains("raw material cost"));
}

#[test]
fn test_auditor_tolerance_from_config() {
    let input = two_ore_input((40.0, 80.0));
    let model = BlendModel::new(&input, CompoundName::TFe).unwrap();
    let constraints = ConstraintBuilder::build(&model);

    // 總和 100.005：寬鬆容差通過，預設容差回報
    let x = [30.0, 70.005];
    let loose = ConstraintAuditor::new(1e-2).audit(&model, &constraints, &x);
    let strict = ConstraintAuditor::default().audit(&model, &constraints, &x);
    assert!(loose.is_clean());
    assert!(!strict.is_clean());
}

#[test]
fn test_hard_failure_returns_unsuccessful_result() {
    // 兩礦都不含 TFe，噸鐵成本無法計算
    let input = InputData::from_rows(
        vec![
            MaterialRow::new("A", 100.0, 30.0, 70.0).with_content("SiO2", 5.0),
            MaterialRow::new("B", 120.0, 30.0, 70.0).with_content("SiO2", 4.0),
        ],
        vec![],
    )
    .unwrap();
    let result = BlendOptimizer::new(config().with_seed(4))
        .unwrap()
        .solve(&input)
        .unwrap();

    assert!(!result.success);
    assert!(matches!(result.status, SearchStatus::Failed(_)));
    assert_eq!(result.iterations, 0);
    assert_eq!(result.ratios.as_slice().len(), 2);
    assert!((result.ratios.sum() - 100.0).abs() < 1e-6);
    assert!(!result.objective.is_finite());
}

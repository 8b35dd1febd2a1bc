//! 兩種礦的最小配礦示例

use blend::{BlendOptimizer, CompoundName, CompoundRow, InputData, MaterialRow, SolverConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 兩礦配比示例 ===\n");

    let input = InputData::from_rows(
        vec![
            MaterialRow::new("A", 100.0, 30.0, 70.0)
                .with_content("TFe", 50.0)
                .with_content("H2O", 10.0),
            MaterialRow::new("B", 120.0, 30.0, 70.0)
                .with_content("TFe", 60.0)
                .with_content("H2O", 5.0),
        ],
        vec![CompoundRow::new("TFe", 40.0, 80.0)],
    )?;

    let optimizer = BlendOptimizer::new(SolverConfig::default().with_seed(2024))?;
    let result = optimizer.solve(&input)?;

    println!("成功: {} ({})", result.success, result.message);
    for (name, ratio) in result.ratios.iter() {
        println!("  - {}: {:.4}", name, ratio);
    }
    println!(
        "TFe: {:.4}%，噸鐵成本: {:.4}",
        result.quantities.composition[&CompoundName::TFe],
        result.objective
    );

    Ok(())
}

//! 燒結配礦示例：四種原料、三項成分約束，輸出結果表格

use blend::{BlendOptimizer, CompoundRow, InputData, MaterialRow, SolverConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== 燒結配礦示例 ===\n");

    let materials = vec![
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
    ];
    let compounds = vec![
        CompoundRow::new("TFe", 50.0, 60.0),
        CompoundRow::new("SiO2", 3.0, 6.0),
        CompoundRow::new("CaO", 5.0, 12.0),
    ];

    println!("原料清單:");
    for row in &materials {
        println!(
            "  - {}: 濕價 {}, 配比 [{}, {}]",
            row.name.as_deref().unwrap_or("-"),
            row.wet_price,
            row.low_bound,
            row.up_bound
        );
    }

    let input = InputData::from_rows(materials, compounds)?;
    let config = SolverConfig::default().with_seed(7).with_max_iterations(200);
    let decimal_places = config.decimal_places;
    let result = BlendOptimizer::new(config)?.solve(&input)?;

    println!("\n求解 {} 完成於 {}", result.run_id, result.solved_at);
    println!("成功: {}，迭代 {} 次，{}", result.success, result.iterations, result.message);

    println!("\n混合料成分:");
    for compound in input.compounds() {
        println!(
            "  - {}: {:.3} (界限 {}, {})",
            compound.name,
            result.quantities.composition[&compound.name],
            compound.low_bound,
            compound.up_bound
        );
    }

    if !result.audit.is_clean() {
        println!("\n未滿足的約束:");
        for message in result.audit.messages() {
            println!("  - {}", message);
        }
    }

    let table = result.to_table(decimal_places);
    println!("\n結果表格:\n{}", table.to_json()?);

    Ok(())
}

//! 結果匯出：最佳解與解池組成的表格

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use blend_core::Result;

use crate::OptimizationResult;

/// 成本列的標籤
pub const OBJECTIVE_ROW_LABEL: &str = "raw material cost";

/// 表格中的一列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// 原料名稱或成本列標籤
    pub label: String,

    /// 每個解一格，非有限值為 `None`
    pub values: Vec<Option<Decimal>>,
}

/// 結果表格：每個原料一列，成本另成一列；第一欄為最佳解，其後為解池（由舊到新）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionTable {
    pub columns: Vec<String>,

    /// 原料列，按原料順序
    pub rows: Vec<TableRow>,

    /// 成本列，與原料列分開存放，原料名稱不會與其標籤衝突
    pub objective: TableRow,
}

impl SolutionTable {
    /// 由優化結果建立表格，數值四捨五入到 `decimal_places` 位
    pub fn from_result(result: &OptimizationResult, decimal_places: u32) -> Self {
        let round = |v: f64| Decimal::from_f64(v).map(|d| d.round_dp(decimal_places));

        let mut columns = vec!["best".to_string()];
        columns.extend((1..=result.pool.len()).map(|i| format!("pool_{}", i)));

        let solutions: Vec<(&[f64], f64)> = std::iter::once((result.ratios.as_slice(), result.objective))
            .chain(
                result
                    .pool
                    .iter()
                    .map(|entry| (entry.ratios.as_slice(), entry.objective)),
            )
            .collect();

        let rows: Vec<TableRow> = result
            .ratios
            .keys()
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| TableRow {
                label: name.clone(),
                values: solutions.iter().map(|(x, _)| round(x[i])).collect(),
            })
            .collect();
        let objective = TableRow {
            label: OBJECTIVE_ROW_LABEL.to_string(),
            values: solutions.iter().map(|(_, f)| round(*f)).collect(),
        };

        Self {
            columns,
            rows,
            objective,
        }
    }

    /// 按原料名稱查找一列
    pub fn row(&self, material: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.label == material)
    }

    /// 成本列
    pub fn objective_row(&self) -> &TableRow {
        &self.objective
    }

    /// 每個原料在最佳解中的配比（按原料順序），即寫回原料表的「配比結果」
    pub fn ratio_results(&self) -> Vec<(&str, Option<Decimal>)> {
        self.rows
            .iter()
            .map(|r| (r.label.as_str(), r.values.first().copied().flatten()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

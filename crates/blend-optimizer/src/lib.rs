//! # Blend Optimizer
//!
//! 優化算法模組（可行初始解、局部求解、盆地跳躍、結果匯出）

pub mod basin_hopping;
pub mod export;
pub mod feasibility;
pub mod local;
pub mod optimizer;
pub mod pool;
pub mod projection;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use blend_calc::{AuditReport, BlendQuantities};
use blend_core::RatioVector;

// Re-export 主要類型
pub use basin_hopping::{BasinHopping, SearchOutcome, SearchState, SearchStatus};
pub use export::{SolutionTable, TableRow};
pub use feasibility::FeasibilitySolver;
pub use local::{LocalOutcome, LocalRefiner, ObjectiveMode, RefinerSettings};
pub use optimizer::BlendOptimizer;
pub use pool::{PoolEntry, SolutionPool};
pub use projection::Polytope;

/// 優化結果
///
/// 搜尋不成功時仍帶有最後到達的配比與目標值，由呼叫端決定是否採用。
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// 本次求解的識別碼
    pub run_id: Uuid,

    /// 求解完成時間
    pub solved_at: DateTime<Utc>,

    /// 是否成功
    pub success: bool,

    /// 搜尋結束狀態
    pub status: SearchStatus,

    /// 求解信息
    pub message: String,

    /// 噸計價成分成本
    pub objective: f64,

    /// 最佳配比
    pub ratios: RatioVector,

    /// 最佳配比下的衍生量
    pub quantities: BlendQuantities,

    /// 解池（由舊到新）
    pub pool: Vec<PoolEntry>,

    /// 最終約束檢查
    pub audit: AuditReport,

    /// 全域搜尋迭代次數
    pub iterations: usize,
}

impl OptimizationResult {
    /// 轉為輸出表格
    pub fn to_table(&self, decimal_places: u32) -> SolutionTable {
        SolutionTable::from_result(self, decimal_places)
    }
}

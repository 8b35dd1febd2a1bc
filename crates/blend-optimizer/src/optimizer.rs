//! 配礦優化流程
//!
//! 可行初始解 → 懲罰目標修正 → 盆地跳躍成本優化 → 約束檢查。
//! 只有上下限本身無可行解時回傳錯誤，其餘不成功的情況都放在結果中回報。

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use blend_calc::{BlendModel, ConstraintAuditor, ConstraintBuilder};
use blend_core::{InputData, Result, SolverConfig};

use crate::basin_hopping::BasinHopping;
use crate::feasibility::FeasibilitySolver;
use crate::local::{LocalRefiner, ObjectiveMode, RefinerSettings};
use crate::OptimizationResult;

/// 配礦優化器
#[derive(Debug, Clone)]
pub struct BlendOptimizer {
    config: SolverConfig,
}

impl BlendOptimizer {
    /// 以驗證過的配置建立
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// 求解；配置有種子時結果可重現
    pub fn solve(&self, input: &InputData) -> Result<OptimizationResult> {
        match self.config.seed {
            Some(seed) => self.solve_with_rng(input, StdRng::seed_from_u64(seed)),
            None => self.solve_with_rng(input, StdRng::from_entropy()),
        }
    }

    /// 以給定亂數來源求解
    pub fn solve_with_rng<R: Rng>(&self, input: &InputData, rng: R) -> Result<OptimizationResult> {
        let model = BlendModel::new(input, self.config.target_compound)?;
        tracing::info!(
            "開始配礦優化: {} 種原料，{} 項成分約束，計價成分 {}",
            model.dimension(),
            model.compounds().len(),
            model.target()
        );

        let seed = FeasibilitySolver::solve(&model)?;
        let auditor = ConstraintAuditor::new(self.config.audit_tolerance);

        // 成分上下限已由懲罰目標表達，這裡只受線性約束
        let linear = ConstraintBuilder::build_linear(&model);
        let settings = RefinerSettings::default()
            .with_tolerance(self.config.solver_tolerance)
            .with_max_iterations(self.config.local_max_iterations);
        let initial = LocalRefiner::new(&model, &linear, ObjectiveMode::Penalty, settings)
            .minimize(seed.as_slice());
        if !initial.converged {
            tracing::warn!("初始解修正未收斂: {}", initial.message);
        }
        auditor.audit(&model, &linear, &initial.x);
        tracing::info!("初始解目標值: {}", initial.objective);

        let full = ConstraintBuilder::build(&model);
        let search = BasinHopping::start(&model, &full, &self.config, rng, &initial.x).run();
        let success = search.is_success();
        if success {
            tracing::info!("優化完成，目標值: {}", search.best_objective);
        } else {
            tracing::error!("優化未成功: {}", search.message);
        }

        let audit = auditor.audit(&model, &full, &search.best_x);
        let quantities = model.quantities(&search.best_x);
        let ratios = model.ratio_vector(search.best_x)?;

        Ok(OptimizationResult {
            run_id: Uuid::new_v4(),
            solved_at: Utc::now(),
            success,
            status: search.status,
            message: search.message,
            objective: search.best_objective,
            ratios,
            quantities,
            pool: search.pool.into_vec(),
            audit,
            iterations: search.iterations,
        })
    }
}

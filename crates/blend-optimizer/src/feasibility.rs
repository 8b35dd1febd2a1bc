//! 可行初始解：以線性規劃求任一滿足原料上下限與總和 100 的配比

use blend_calc::constraint::RATIO_SUM;
use blend_calc::BlendModel;
use blend_core::{BlendError, RatioVector, Result};
use microlp::{ComparisonOp, OptimizationDirection, Problem};

/// 可行解求解器
pub struct FeasibilitySolver;

impl FeasibilitySolver {
    /// 求任一可行配比（零目標線性規劃）
    ///
    /// 上下限與總和 100 互相矛盾時回傳 [`BlendError::Infeasible`]。
    pub fn solve(model: &BlendModel) -> Result<RatioVector> {
        let (lows, highs) = model.ratio_bounds();

        let low_sum: f64 = lows.iter().sum();
        let high_sum: f64 = highs.iter().sum();
        if low_sum > RATIO_SUM || high_sum < RATIO_SUM {
            return Err(BlendError::Infeasible(format!(
                "原料配比下限總和 {} 、上限總和 {} 無法滿足總和 {}",
                low_sum, high_sum, RATIO_SUM
            )));
        }

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<_> = lows
            .iter()
            .zip(&highs)
            .map(|(&low, &high)| problem.add_var(0.0, (low, high)))
            .collect();
        problem.add_constraint(
            vars.iter().map(|&v| (v, 1.0)),
            ComparisonOp::Eq,
            RATIO_SUM,
        );

        let solution = problem.solve().map_err(|e| match e {
            microlp::Error::Infeasible => {
                BlendError::Infeasible("原料配比上下限與總和約束無可行解".to_string())
            }
            other => BlendError::Solver(other.to_string()),
        })?;

        let values: Vec<f64> = vars.iter().map(|&v| solution[v]).collect();
        tracing::info!("可行初始解: {:?}", values);

        model.ratio_vector(values)
    }
}

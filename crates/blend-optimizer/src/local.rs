//! 局部約束優化
//!
//! 線性約束（原料上下限、配比總和）以投影精確處理；成分上下限以增廣拉格朗日外層迴圈處理；
//! 內層為譜投影梯度法（Barzilai–Borwein 步長 + Armijo 回溯），梯度以前向差分近似。
//! 未收斂不視為錯誤，回傳目前最佳點由呼叫端記錄與檢查。

use blend_calc::{BlendModel, Constraint, ConstraintSet};

use crate::projection::Polytope;

/// 局部求解的目標
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveMode {
    /// 成分越界平方和（修正初始解用）
    Penalty,
    /// 噸計價成分成本
    Cost,
}

/// 局部求解參數
#[derive(Debug, Clone, Copy)]
pub struct RefinerSettings {
    /// 收斂容差（約束殘差與目標變化）
    pub tolerance: f64,
    /// 每次內層求解的迭代上限
    pub max_iterations: usize,
    /// 增廣拉格朗日外層迭代上限
    pub max_outer_iterations: usize,
    /// 初始懲罰參數 μ
    pub mu_init: f64,
    /// μ 的放大倍數
    pub mu_factor: f64,
    /// μ 的上限
    pub mu_max: f64,
    pub armijo_c1: f64,
    pub backtrack_beta: f64,
    pub max_line_search_trials: usize,
    /// 內層投影梯度的停止門檻
    pub pg_tolerance: f64,
    /// 前向差分步長
    pub fd_step: f64,
}

impl Default for RefinerSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-2,
            max_iterations: 100,
            max_outer_iterations: 20,
            mu_init: 10.0,
            mu_factor: 5.0,
            mu_max: 1e8,
            armijo_c1: 1e-4,
            backtrack_beta: 0.5,
            max_line_search_trials: 40,
            pg_tolerance: 1e-7,
            fd_step: f64::EPSILON.sqrt(),
        }
    }
}

impl RefinerSettings {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }
}

/// 局部求解結果
#[derive(Debug, Clone)]
pub struct LocalOutcome {
    /// 到達的配比
    pub x: Vec<f64>,
    /// 目標函數值
    pub objective: f64,
    /// 是否收斂
    pub converged: bool,
    /// 內層迭代總數
    pub iterations: usize,
    /// 求解訊息
    pub message: String,
}

impl LocalOutcome {
    /// 目標值非有限，無法繼續使用
    pub fn is_hard_failure(&self) -> bool {
        !self.objective.is_finite()
    }
}

/// 局部求解器
#[derive(Debug, Clone)]
pub struct LocalRefiner<'a> {
    model: &'a BlendModel,
    nonlinear: Vec<Constraint>,
    polytope: Polytope,
    mode: ObjectiveMode,
    settings: RefinerSettings,
}

impl<'a> LocalRefiner<'a> {
    /// 以模型與約束集合建立，約束中的線性部分轉為投影多面體
    pub fn new(
        model: &'a BlendModel,
        constraints: &ConstraintSet,
        mode: ObjectiveMode,
        settings: RefinerSettings,
    ) -> Self {
        Self {
            model,
            nonlinear: constraints.nonlinear().into_iter().cloned().collect(),
            polytope: Polytope::from_constraints(model, constraints),
            mode,
            settings,
        }
    }

    pub fn mode(&self) -> ObjectiveMode {
        self.mode
    }

    /// 目標函數值
    pub fn objective(&self, x: &[f64]) -> f64 {
        match self.mode {
            ObjectiveMode::Penalty => self.model.penalty(x),
            ObjectiveMode::Cost => self.model.cost(x),
        }
    }

    /// 從 `x0` 出發做局部最小化
    pub fn minimize(&self, x0: &[f64]) -> LocalOutcome {
        let tol = self.settings.tolerance;
        let mut x = self.polytope.project(x0);
        let mut f_prev = self.objective(&x);
        if !f_prev.is_finite() {
            return self.failure(x, f_prev, 0);
        }

        let mut lambdas = vec![0.0; self.nonlinear.len()];
        let mut mu = self.settings.mu_init;
        let mut prev_violation = self.max_violation(&self.residuals(&x));
        let mut iterations = 0;

        for outer in 0..self.settings.max_outer_iterations {
            let (x_new, inner) = self.minimize_inner(&x, &lambdas, mu);
            iterations += inner;
            x = x_new;

            let f = self.objective(&x);
            if !f.is_finite() {
                return self.failure(x, f, iterations);
            }

            let residuals = self.residuals(&x);
            let violation = self.max_violation(&residuals);
            for (lambda, g) in lambdas.iter_mut().zip(&residuals) {
                *lambda = (*lambda - mu * g).max(0.0);
            }

            let change = (f - f_prev).abs();
            tracing::trace!(
                "外層迭代 {}: f = {}, 違反 = {}, μ = {}",
                outer,
                f,
                violation,
                mu
            );
            if violation <= tol && change <= tol {
                return LocalOutcome {
                    x,
                    objective: f,
                    converged: true,
                    iterations,
                    message: "Optimization terminated successfully".to_string(),
                };
            }

            if violation > 0.25 * prev_violation {
                mu = (mu * self.settings.mu_factor).min(self.settings.mu_max);
            }
            prev_violation = violation;
            f_prev = f;
        }

        let objective = self.objective(&x);
        LocalOutcome {
            x,
            objective,
            converged: false,
            iterations,
            message: "Iteration limit reached".to_string(),
        }
    }

    fn failure(&self, x: Vec<f64>, objective: f64, iterations: usize) -> LocalOutcome {
        tracing::warn!("局部求解目標值非有限: {}", objective);
        LocalOutcome {
            x,
            objective,
            converged: false,
            iterations,
            message: format!("Objective is not finite: {}", objective),
        }
    }

    fn residuals(&self, x: &[f64]) -> Vec<f64> {
        self.nonlinear
            .iter()
            .map(|c| c.evaluate(self.model, x))
            .collect()
    }

    fn max_violation(&self, residuals: &[f64]) -> f64 {
        residuals.iter().map(|g| (-g).max(0.0)).fold(0.0, f64::max)
    }

    /// 增廣拉格朗日函數（不等式 g(x) ≥ 0）
    fn lagrangian(&self, x: &[f64], lambdas: &[f64], mu: f64) -> f64 {
        let penalty: f64 = self
            .nonlinear
            .iter()
            .zip(lambdas)
            .map(|(c, &lambda)| {
                let g = c.evaluate(self.model, x);
                if lambda - mu * g > 0.0 {
                    -lambda * g + 0.5 * mu * g * g
                } else {
                    -lambda * lambda / (2.0 * mu)
                }
            })
            .sum();
        self.objective(x) + penalty
    }

    fn gradient(&self, x: &[f64], value: f64, lambdas: &[f64], mu: f64) -> Vec<f64> {
        let mut probe = x.to_vec();
        (0..x.len())
            .map(|i| {
                let h = self.settings.fd_step * x[i].abs().max(1.0);
                probe[i] = x[i] + h;
                let shifted = self.lagrangian(&probe, lambdas, mu);
                probe[i] = x[i];
                (shifted - value) / h
            })
            .collect()
    }

    fn minimize_inner(&self, x0: &[f64], lambdas: &[f64], mu: f64) -> (Vec<f64>, usize) {
        let cfg = &self.settings;
        let mut x = x0.to_vec();
        let mut value = self.lagrangian(&x, lambdas, mu);
        if !value.is_finite() {
            return (x, 0);
        }
        let mut grad = self.gradient(&x, value, lambdas, mu);

        let pg = self.polytope.projected_gradient_norm(&x, &grad);
        let mut alpha = if pg > 0.0 { 1.0 / pg } else { 1.0 };

        for k in 0..cfg.max_iterations {
            if self.polytope.projected_gradient_norm(&x, &grad) <= cfg.pg_tolerance {
                return (x, k);
            }

            let trial: Vec<f64> = x.iter().zip(&grad).map(|(xi, gi)| xi - alpha * gi).collect();
            let direction: Vec<f64> = self
                .polytope
                .project(&trial)
                .iter()
                .zip(&x)
                .map(|(p, xi)| p - xi)
                .collect();
            let slope = dot(&grad, &direction);
            if direction.iter().all(|d| d.abs() <= 1e-14) || slope >= 0.0 {
                return (x, k);
            }

            let mut t = 1.0;
            let mut accepted = None;
            for _ in 0..cfg.max_line_search_trials {
                let candidate: Vec<f64> = x
                    .iter()
                    .zip(&direction)
                    .map(|(xi, di)| xi + t * di)
                    .collect();
                let candidate_value = self.lagrangian(&candidate, lambdas, mu);
                if candidate_value.is_finite()
                    && candidate_value <= value + cfg.armijo_c1 * t * slope
                {
                    accepted = Some((candidate, candidate_value));
                    break;
                }
                t *= cfg.backtrack_beta;
            }

            let Some((next, next_value)) = accepted else {
                return (x, k + 1);
            };

            let next_grad = self.gradient(&next, next_value, lambdas, mu);
            let s: Vec<f64> = next.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = next_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let sty = dot(&s, &y);
            alpha = if sty > 0.0 {
                (dot(&s, &s) / sty).clamp(1e-10, 1e10)
            } else {
                1e10
            };

            let decrease = value - next_value;
            x = next;
            value = next_value;
            grad = next_grad;
            if decrease <= 1e-12 * (1.0 + value.abs()) {
                return (x, k + 1);
            }
        }

        (x, cfg.max_iterations)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blend_calc::ConstraintBuilder;
    use blend_core::{CompoundName, CompoundRow, InputData, MaterialRow};

    fn model(tfe_bounds: (f64, f64)) -> BlendModel {
        let input = InputData::from_rows(
            vec![
                MaterialRow::new("A", 100.0, 30.0, 70.0)
                    .with_content("TFe", 50.0)
                    .with_content("H2O", 10.0),
                MaterialRow::new("B", 120.0, 30.0, 70.0)
                    .with_content("TFe", 60.0)
                    .with_content("H2O", 5.0),
            ],
            vec![CompoundRow::new("TFe", tfe_bounds.0, tfe_bounds.1)],
        )
        .unwrap();
        BlendModel::new(&input, CompoundName::TFe).unwrap()
    }

    #[test]
    fn test_penalty_mode_reaches_compound_window() {
        let model = model((56.0, 58.0));
        let linear = ConstraintBuilder::build_linear(&model);
        let refiner =
            LocalRefiner::new(&model, &linear, ObjectiveMode::Penalty, RefinerSettings::default());

        // 起點 TFe = 53，在窗口之外
        let outcome = refiner.minimize(&[70.0, 30.0]);

        assert!(!outcome.is_hard_failure());
        assert!((outcome.x.iter().sum::<f64>() - 100.0).abs() < 1e-6);
        let fe = model.composition(&outcome.x, CompoundName::TFe);
        assert!(fe > 56.0 - 0.1 && fe < 58.0 + 0.1, "TFe = {}", fe);
        assert!(outcome.objective < 1e-2);
    }

    #[test]
    fn test_cost_mode_respects_compound_bounds() {
        // A 的噸鐵成本 90/50 = 1.8，B 為 114/60 = 1.9，成本驅動 A 上升，TFe 上限不綁定、下限 54 綁定
        let model = model((54.0, 80.0));
        let full = ConstraintBuilder::build(&model);
        let refiner =
            LocalRefiner::new(&model, &full, ObjectiveMode::Cost, RefinerSettings::default());

        let outcome = refiner.minimize(&[40.0, 60.0]);

        assert!(!outcome.is_hard_failure());
        assert!(full.is_satisfied(&model, &outcome.x, 1e-2), "{:?}", outcome.x);
        // 最佳配比 A = 60、B = 40
        assert!((outcome.x[0] - 60.0).abs() < 0.5, "{:?}", outcome.x);
        assert!(outcome.objective <= model.cost(&[40.0, 60.0]));
    }

    #[test]
    fn test_projection_applied_to_start() {
        let model = model((40.0, 80.0));
        let full = ConstraintBuilder::build(&model);
        let refiner =
            LocalRefiner::new(&model, &full, ObjectiveMode::Cost, RefinerSettings::default());

        // 起點越界且總和不為 100
        let outcome = refiner.minimize(&[90.0, 90.0]);
        assert!((outcome.x.iter().sum::<f64>() - 100.0).abs() < 1e-6);
        assert!(outcome.x.iter().all(|&v| (30.0 - 1e-9..=70.0 + 1e-9).contains(&v)));
        // 無綁定成分約束時，A 取上限
        assert!((outcome.x[0] - 70.0).abs() < 0.5, "{:?}", outcome.x);
    }

    #[test]
    fn test_non_finite_objective_is_hard_failure() {
        // 沒有任何原料含計價成分，成本為無窮大
        let input = InputData::from_rows(
            vec![
                MaterialRow::new("A", 100.0, 0.0, 100.0),
                MaterialRow::new("B", 120.0, 0.0, 100.0),
            ],
            vec![],
        )
        .unwrap();
        let model = BlendModel::new(&input, CompoundName::TFe).unwrap();
        let full = ConstraintBuilder::build(&model);
        let refiner =
            LocalRefiner::new(&model, &full, ObjectiveMode::Cost, RefinerSettings::default());

        let outcome = refiner.minimize(&[50.0, 50.0]);
        assert!(outcome.is_hard_failure());
        assert!(!outcome.converged);
    }
}

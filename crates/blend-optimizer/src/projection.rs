//! 線性可行域 `{low ≤ x ≤ high, Σx = total}` 上的歐氏投影

use blend_calc::constraint::RATIO_SUM;
use blend_calc::{BlendModel, ConstraintSet};

const BISECTION_ITERS: usize = 100;
const EPS: f64 = 1e-12;

/// 原料上下限與（可選的）配比總和構成的多面體
#[derive(Debug, Clone)]
pub struct Polytope {
    lower: Vec<f64>,
    upper: Vec<f64>,
    total: Option<f64>,
}

impl Polytope {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>, total: Option<f64>) -> Self {
        Self { lower, upper, total }
    }

    /// 由模型的原料上下限與約束集合中的線性約束建立
    pub fn from_constraints(model: &BlendModel, constraints: &ConstraintSet) -> Self {
        let (lower, upper) = model.ratio_bounds();
        let total = constraints.has_ratio_sum().then_some(RATIO_SUM);
        Self::new(lower, upper, total)
    }

    /// 投影到多面體上
    ///
    /// 有總和約束時求純量位移 λ 使 `Σ clamp(y − λ, low, high) = total`；
    /// 上下限本身無法達到總和時回傳最接近的頂點（全下限或全上限）。
    pub fn project(&self, y: &[f64]) -> Vec<f64> {
        let Some(total) = self.total else {
            return self.clamp_shifted(y, 0.0);
        };

        let low_sum: f64 = self.lower.iter().sum();
        let high_sum: f64 = self.upper.iter().sum();
        if total <= low_sum {
            return self.lower.clone();
        }
        if total >= high_sum {
            return self.upper.clone();
        }

        // shift 越大總和越小
        let mut lo = y
            .iter()
            .zip(&self.upper)
            .map(|(yi, hi)| yi - hi)
            .fold(f64::INFINITY, f64::min);
        let mut hi = y
            .iter()
            .zip(&self.lower)
            .map(|(yi, lo)| yi - lo)
            .fold(f64::NEG_INFINITY, f64::max);

        for _ in 0..BISECTION_ITERS {
            let mid = 0.5 * (lo + hi);
            let sum: f64 = self.clamp_shifted(y, mid).iter().sum();
            if sum > total {
                lo = mid;
            } else {
                hi = mid;
            }
            if (hi - lo).abs() <= EPS * (1.0 + hi.abs()) {
                break;
            }
        }

        self.clamp_shifted(y, 0.5 * (lo + hi))
    }

    /// 投影梯度的無窮範數：`‖P(x − g) − x‖∞`
    pub fn projected_gradient_norm(&self, x: &[f64], grad: &[f64]) -> f64 {
        let trial: Vec<f64> = x.iter().zip(grad).map(|(xi, gi)| xi - gi).collect();
        self.project(&trial)
            .iter()
            .zip(x)
            .map(|(p, xi)| (p - xi).abs())
            .fold(0.0, f64::max)
    }

    fn clamp_shifted(&self, y: &[f64], shift: f64) -> Vec<f64> {
        y.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(yi, (lo, hi))| (yi - shift).clamp(*lo, *hi))
            .collect()
    }
}

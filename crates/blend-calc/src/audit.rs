//! 求解後約束檢查
//!
//! 只記錄與回報，不修改配比也不中斷流程。

use serde::Serialize;
use std::fmt;

use crate::constraint::{ConstraintKind, ConstraintSet};
use crate::model::BlendModel;

/// 預設檢查容差（比求解器的 1e-2 更嚴）
pub const DEFAULT_AUDIT_TOLERANCE: f64 = 1e-3;

/// 單條約束違反記錄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// 約束名稱
    pub name: String,

    /// 約束類型
    pub kind: ConstraintKind,

    /// 殘差值
    pub value: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constraint '{}' ({}) not satisfied: value = {}",
            self.name, self.kind, self.value
        )
    }
}

/// 檢查報告
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// 是否全部滿足
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// 違反訊息
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// 約束檢查器
#[derive(Debug, Clone, Copy)]
pub struct ConstraintAuditor {
    tolerance: f64,
}

impl Default for ConstraintAuditor {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_TOLERANCE)
    }
}

impl ConstraintAuditor {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// 檢查 `x` 是否滿足全部約束，違反項逐條記錄為 error 日誌
    pub fn audit(&self, model: &BlendModel, constraints: &ConstraintSet, x: &[f64]) -> AuditReport {
        let violations: Vec<Violation> = constraints
            .iter()
            .filter_map(|c| {
                let value = c.evaluate(model, x);
                let violated = match c.kind {
                    ConstraintKind::Inequality => value < -self.tolerance,
                    ConstraintKind::Equality => value.abs() > self.tolerance,
                };
                violated.then(|| Violation {
                    name: c.name.clone(),
                    kind: c.kind,
                    value,
                })
            })
            .collect();

        if !violations.is_empty() {
            tracing::error!("以下約束條件未滿足:");
            for violation in &violations {
                tracing::error!("{}", violation);
            }
        }

        AuditReport { violations }
    }
}

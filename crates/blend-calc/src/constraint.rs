//! 約束建構
//!
//! 每條約束都是一筆描述記錄（實體鍵 + 邊界方向 + 類型），
//! 評估時由同一個函式按鍵查找實體，不在建構時捕獲迴圈變數。

use blend_core::CompoundName;
use serde::Serialize;
use std::fmt;

use crate::model::BlendModel;

/// 約束類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstraintKind {
    /// 等式：殘差 = 0
    Equality,
    /// 不等式：殘差 ≥ 0
    Inequality,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Equality => f.write_str("equality"),
            ConstraintKind::Inequality => f.write_str("inequality"),
        }
    }
}

/// 邊界方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoundSide {
    Lower,
    Upper,
}

impl BoundSide {
    fn label(&self) -> &'static str {
        match self {
            BoundSide::Lower => "lower",
            BoundSide::Upper => "upper",
        }
    }
}

/// 約束作用的對象
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConstraintTarget {
    /// 單一原料的配比上下限
    MaterialRatio { material: String, side: BoundSide },
    /// 配比總和 = 100
    RatioSum,
    /// 單一成分的計劃含量上下限
    CompoundBound { compound: CompoundName, side: BoundSide },
}

/// 約束描述記錄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    /// 類型
    pub kind: ConstraintKind,

    /// 作用對象
    pub target: ConstraintTarget,

    /// 診斷用名稱，不參與控制流程
    pub name: String,
}

/// 配比總和的目標值
pub const RATIO_SUM: f64 = 100.0;

impl Constraint {
    /// 原料配比上下限約束
    pub fn material_ratio(material: &str, side: BoundSide) -> Self {
        Self {
            kind: ConstraintKind::Inequality,
            name: format!("material_{}_ratio_{}_bound_constraint", material, side.label()),
            target: ConstraintTarget::MaterialRatio {
                material: material.to_string(),
                side,
            },
        }
    }

    /// 配比總和約束
    pub fn ratio_sum() -> Self {
        Self {
            kind: ConstraintKind::Equality,
            name: "material_ratio_sum_limit_constraint".to_string(),
            target: ConstraintTarget::RatioSum,
        }
    }

    /// 成分上下限約束
    pub fn compound_bound(compound: CompoundName, side: BoundSide) -> Self {
        Self {
            kind: ConstraintKind::Inequality,
            name: format!("cc_{}_{}_bounds_constraint", compound, side.label()),
            target: ConstraintTarget::CompoundBound { compound, side },
        }
    }

    /// 是否為線性約束（原料上下限或配比總和）
    pub fn is_linear(&self) -> bool {
        !matches!(self.target, ConstraintTarget::CompoundBound { .. })
    }

    /// 在 `x` 處評估殘差
    ///
    /// 不等式殘差 ≥ 0 表示滿足；等式殘差 = 0 表示滿足。
    /// 模型中找不到的實體視為無約束，回傳 0。
    pub fn evaluate(&self, model: &BlendModel, x: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), model.dimension(), "配比向量長度與原料數量不一致");
        match &self.target {
            ConstraintTarget::MaterialRatio { material, side } => {
                let Some(i) = model.keys().position(material) else {
                    return 0.0;
                };
                let (low, high) = model.materials()[i].ratio_bounds();
                match side {
                    BoundSide::Lower => x[i] - low,
                    BoundSide::Upper => high - x[i],
                }
            }
            ConstraintTarget::RatioSum => RATIO_SUM - x.iter().sum::<f64>(),
            ConstraintTarget::CompoundBound { compound, side } => {
                let Some(cc) = model.compound(*compound) else {
                    return 0.0;
                };
                let value = model.composition(x, *compound);
                match side {
                    BoundSide::Lower => value - cc.low_bound,
                    BoundSide::Upper => cc.up_bound - value,
                }
            }
        }
    }

    /// 殘差是否在容差內
    pub fn is_satisfied(&self, model: &BlendModel, x: &[f64], tolerance: f64) -> bool {
        let value = self.evaluate(model, x);
        match self.kind {
            ConstraintKind::Inequality => value >= -tolerance,
            ConstraintKind::Equality => value.abs() <= tolerance,
        }
    }
}

/// 一次求解使用的約束集合（建構後不變）
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// 是否包含配比總和約束
    pub fn has_ratio_sum(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| c.target == ConstraintTarget::RatioSum)
    }

    /// 非線性約束（成分上下限）
    pub fn nonlinear(&self) -> Vec<&Constraint> {
        self.constraints.iter().filter(|c| !c.is_linear()).collect()
    }

    /// 全部約束是否在容差內
    pub fn is_satisfied(&self, model: &BlendModel, x: &[f64], tolerance: f64) -> bool {
        self.constraints
            .iter()
            .all(|c| c.is_satisfied(model, x, tolerance))
    }
}

/// 約束建構器
pub struct ConstraintBuilder;

impl ConstraintBuilder {
    /// 完整約束集合：原料上下限、配比總和、成分上下限
    pub fn build(model: &BlendModel) -> ConstraintSet {
        let mut constraints = Self::material_ratio_bounds(model);
        constraints.push(Constraint::ratio_sum());
        constraints.extend(Self::compound_bounds(model));
        ConstraintSet::new(constraints)
    }

    /// 線性約束集合：原料上下限與配比總和
    pub fn build_linear(model: &BlendModel) -> ConstraintSet {
        let mut constraints = Self::material_ratio_bounds(model);
        constraints.push(Constraint::ratio_sum());
        ConstraintSet::new(constraints)
    }

    fn material_ratio_bounds(model: &BlendModel) -> Vec<Constraint> {
        model
            .keys()
            .names()
            .iter()
            .flat_map(|name| {
                [BoundSide::Lower, BoundSide::Upper]
                    .into_iter()
                    .map(move |side| Constraint::material_ratio(name, side))
            })
            .collect()
    }

    fn compound_bounds(model: &BlendModel) -> Vec<Constraint> {
        model
            .compounds()
            .iter()
            .flat_map(|cc| {
                [BoundSide::Lower, BoundSide::Upper]
                    .into_iter()
                    .map(move |side| Constraint::compound_bound(cc.name, side))
            })
            .collect()
    }
}

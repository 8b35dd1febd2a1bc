//! 衍生量計算：由配比向量推導計劃質量、成分與成本
//!
//! 所有函式都是純函式，每次評估都重新計算，不做快取。
//! `x` 的順序必須與 `materials` 一致。

use blend_core::{CompoundName, Material};
use serde::Serialize;
use std::collections::BTreeMap;

/// 一個配比向量的全部衍生量
#[derive(Debug, Clone, Serialize)]
pub struct BlendQuantities {
    /// 各原料計劃質量（濕基當量）
    pub plan_mass: Vec<f64>,

    /// 各原料計劃質量佔比（總和 100）
    pub plan_share: Vec<f64>,

    /// 混合料成分（%）
    pub composition: BTreeMap<CompoundName, f64>,

    /// 混合料乾基價
    pub dry_price: f64,

    /// 噸計價成分成本
    pub cost_per_ton: f64,
}

/// 衍生量計算器
pub struct DerivedCalculator;

impl DerivedCalculator {
    /// 計劃質量：`x[m] / (1 − 水分[m]/100)`
    pub fn plan_mass(materials: &[Material], x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(materials.len(), x.len(), "配比向量長度與原料數量不一致");
        materials
            .iter()
            .zip(x)
            .map(|(m, &ratio)| ratio / (1.0 - m.water_fraction() / 100.0))
            .collect()
    }

    /// 計劃質量佔比：`100 × plan_mass[m] / Σ plan_mass`
    pub fn plan_mass_share(plan_mass: &[f64]) -> Vec<f64> {
        let total: f64 = plan_mass.iter().sum();
        plan_mass.iter().map(|p| p * 100.0 / total).collect()
    }

    /// 單一成分的計劃含量
    ///
    /// 非水分成分以配比加權：`Σ x[m]·c[m] / Σ x[m]`；
    /// 水分以計劃質量佔比加權，見 [`Self::water_composition`]。
    pub fn compound_composition(materials: &[Material], x: &[f64], compound: CompoundName) -> f64 {
        if compound.is_water() {
            return Self::water_composition(materials, x);
        }
        Self::ratio_weighted(materials, x, |m| m.content(compound))
    }

    /// 水分計劃含量：`Σ share[m]·水分[m] / Σ share[m]`
    pub fn water_composition(materials: &[Material], x: &[f64]) -> f64 {
        let share = Self::plan_mass_share(&Self::plan_mass(materials, x));
        let weighted: f64 = materials
            .iter()
            .zip(&share)
            .map(|(m, s)| s * m.water_fraction())
            .sum();
        weighted / share.iter().sum::<f64>()
    }

    /// 全部可識別成分的計劃含量
    pub fn plan_composition(materials: &[Material], x: &[f64]) -> BTreeMap<CompoundName, f64> {
        CompoundName::ALL
            .iter()
            .map(|&c| (c, Self::compound_composition(materials, x, c)))
            .collect()
    }

    /// 混合料乾基價（配比加權）
    pub fn dry_price(materials: &[Material], x: &[f64]) -> f64 {
        Self::ratio_weighted(materials, x, Material::dry_price)
    }

    /// 噸計價成分成本：乾基價 / 計價成分含量
    pub fn cost_per_ton(dry_price: f64, target_composition: f64) -> f64 {
        dry_price / target_composition
    }

    /// 目標函數：給定計價成分的噸成本
    pub fn objective(materials: &[Material], x: &[f64], target: CompoundName) -> f64 {
        Self::cost_per_ton(
            Self::dry_price(materials, x),
            Self::compound_composition(materials, x, target),
        )
    }

    /// 一次計算全部衍生量
    pub fn evaluate(materials: &[Material], x: &[f64], target: CompoundName) -> BlendQuantities {
        let plan_mass = Self::plan_mass(materials, x);
        let plan_share = Self::plan_mass_share(&plan_mass);
        let composition = Self::plan_composition(materials, x);
        let dry_price = Self::dry_price(materials, x);
        let target_composition = composition.get(&target).copied().unwrap_or(0.0);

        BlendQuantities {
            plan_mass,
            plan_share,
            composition,
            dry_price,
            cost_per_ton: Self::cost_per_ton(dry_price, target_composition),
        }
    }

    fn ratio_weighted(materials: &[Material], x: &[f64], value: impl Fn(&Material) -> f64) -> f64 {
        debug_assert_eq!(materials.len(), x.len(), "配比向量長度與原料數量不一致");
        let (weighted, total) = materials
            .iter()
            .zip(x)
            .fold((0.0, 0.0), |(w, t), (m, &ratio)| (w + ratio * value(m), t + ratio));
        weighted / total
    }
}

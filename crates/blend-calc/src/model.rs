//! 配礦模型：原料、成分約束與固定的原料順序
//!
//! 可行初始解與成本優化兩種求解都以值的方式使用同一個模型。

use blend_core::{
    BlendError, ChemicalCompound, CompoundName, InputData, Material, MaterialKeys, RatioVector,
    Result,
};

use crate::derived::{BlendQuantities, DerivedCalculator};

/// 配礦模型
#[derive(Debug, Clone)]
pub struct BlendModel {
    materials: Vec<Material>,
    compounds: Vec<ChemicalCompound>,
    keys: MaterialKeys,
    target: CompoundName,
}

impl BlendModel {
    /// 由輸入資料建立模型，原料順序在此固定
    pub fn new(input: &InputData, target: CompoundName) -> Result<Self> {
        if input.materials().is_empty() {
            return Err(BlendError::Validation("原料清單為空".to_string()));
        }

        let keys = MaterialKeys::new(input.materials().iter().map(|m| m.name.clone()).collect())?;

        Ok(Self {
            materials: input.materials().to_vec(),
            compounds: input.compounds().to_vec(),
            keys,
            target,
        })
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn compounds(&self) -> &[ChemicalCompound] {
        &self.compounds
    }

    pub fn keys(&self) -> &MaterialKeys {
        &self.keys
    }

    /// 計價成分
    pub fn target(&self) -> CompoundName {
        self.target
    }

    pub fn dimension(&self) -> usize {
        self.materials.len()
    }

    /// 按名稱查找原料
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.keys.position(name).map(|i| &self.materials[i])
    }

    /// 按名稱查找成分約束
    pub fn compound(&self, name: CompoundName) -> Option<&ChemicalCompound> {
        self.compounds.iter().find(|c| c.name == name)
    }

    /// 各原料配比上下限（按原料順序）
    pub fn ratio_bounds(&self) -> (Vec<f64>, Vec<f64>) {
        self.materials.iter().map(Material::ratio_bounds).unzip()
    }

    /// 成分計劃含量
    pub fn composition(&self, x: &[f64], compound: CompoundName) -> f64 {
        DerivedCalculator::compound_composition(&self.materials, x, compound)
    }

    /// 成本目標：噸計價成分成本
    pub fn cost(&self, x: &[f64]) -> f64 {
        DerivedCalculator::objective(&self.materials, x, self.target)
    }

    /// 懲罰目標：成分越界量的平方和，全部在界內時為 0
    pub fn penalty(&self, x: &[f64]) -> f64 {
        self.compounds
            .iter()
            .map(|c| {
                let value = self.composition(x, c.name);
                if value < c.low_bound {
                    (c.low_bound - value).powi(2)
                } else if value > c.up_bound {
                    (c.up_bound - value).powi(2)
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// 全部衍生量
    pub fn quantities(&self, x: &[f64]) -> BlendQuantities {
        DerivedCalculator::evaluate(&self.materials, x, self.target)
    }

    /// 以模型的原料順序包裝數值向量
    pub fn ratio_vector(&self, values: Vec<f64>) -> Result<RatioVector> {
        RatioVector::new(self.keys.clone(), values)
    }
}

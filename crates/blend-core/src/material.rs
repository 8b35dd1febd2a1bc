//! 原料模型

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::{BlendError, CompoundName, Result};

/// 原料（礦石、熔劑等）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 原料名稱（唯一鍵）
    pub name: String,

    /// 濕基價
    pub wet_price: f64,

    /// 配比下限（%，乾基）
    pub low_bound: f64,

    /// 配比上限（%，乾基）
    pub up_bound: f64,

    /// 各成分含量（質量百分比，含水分）
    pub contents: HashMap<CompoundName, f64>,
}

impl Material {
    /// 創建新的原料，要求價格與上下限有限且 `low ≤ high`
    pub fn new(name: String, wet_price: f64, low_bound: f64, up_bound: f64) -> Result<Self> {
        if !wet_price.is_finite() || !low_bound.is_finite() || !up_bound.is_finite() {
            return Err(BlendError::Validation(format!(
                "原料 {} 的價格或上下限不是有限數值",
                name
            )));
        }
        if low_bound > up_bound {
            return Err(BlendError::Validation(format!(
                "原料 {} 的下限 {} 大於上限 {}",
                name, low_bound, up_bound
            )));
        }

        Ok(Self {
            name,
            wet_price,
            low_bound,
            up_bound,
            contents: HashMap::new(),
        })
    }

    /// 建構器模式：設置成分含量
    pub fn with_content(mut self, compound: CompoundName, percentage: f64) -> Self {
        self.contents.insert(compound, percentage);
        self
    }

    /// 成分含量，未設置時為 0
    pub fn content(&self, compound: CompoundName) -> f64 {
        self.contents.get(&compound).copied().unwrap_or(0.0)
    }

    /// 水分含量（%）
    pub fn water_fraction(&self) -> f64 {
        self.content(CompoundName::H2O)
    }

    /// 乾基價 = 濕基價 × (1 − 水分/100)
    pub fn dry_price(&self) -> f64 {
        self.wet_price * (1.0 - self.water_fraction() / 100.0)
    }

    /// 配比上下限
    pub fn ratio_bounds(&self) -> (f64, f64) {
        (self.low_bound, self.up_bound)
    }

    /// 檢查成分含量：全部有限，水分在 [0, 100)
    pub fn validate_contents(&self) -> Result<()> {
        if let Some((compound, value)) = self.contents.iter().find(|(_, v)| !v.is_finite()) {
            return Err(BlendError::Validation(format!(
                "原料 {} 的成分 {} 含量不是有限數值: {}",
                self.name, compound, value
            )));
        }

        let water = self.water_fraction();
        if !(0.0..100.0).contains(&water) {
            return Err(BlendError::Validation(format!(
                "原料 {} 的水分 {} 必須位於 [0, 100)",
                self.name, water
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} {})",
            self.name, self.wet_price, self.low_bound, self.up_bound
        )
    }
}

//! 輸入資料：由表格讀取層交付的已解析資料列

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{BlendError, ChemicalCompound, CompoundName, MaterialKeys, Material, Result};

/// 原料表的一列
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialRow {
    /// 原料名稱（空白列會被丟棄）
    pub name: Option<String>,

    /// 濕基價
    pub wet_price: f64,

    /// 配比下限
    pub low_bound: f64,

    /// 配比上限
    pub up_bound: f64,

    /// 成分欄位（欄位標籤 → 含量 %）
    pub contents: HashMap<String, f64>,
}

impl MaterialRow {
    /// 創建新的原料列
    pub fn new(name: &str, wet_price: f64, low_bound: f64, up_bound: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            wet_price,
            low_bound,
            up_bound,
            contents: HashMap::new(),
        }
    }

    /// 建構器模式：設置成分欄位
    pub fn with_content(mut self, label: &str, percentage: f64) -> Self {
        self.contents.insert(label.to_string(), percentage);
        self
    }
}

/// 成分表的一列
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompoundRow {
    /// 成分名稱（無法識別的會被丟棄）
    pub name: Option<String>,

    /// 下限
    pub low_bound: f64,

    /// 上限
    pub up_bound: f64,
}

impl CompoundRow {
    /// 創建新的成分列
    pub fn new(name: &str, low_bound: f64, up_bound: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            low_bound,
            up_bound,
        }
    }
}

/// 一次求解的全部輸入：按讀取順序排列的原料與成分約束
#[derive(Debug, Clone)]
pub struct InputData {
    materials: Vec<Material>,
    compounds: Vec<ChemicalCompound>,
}

impl InputData {
    /// 直接由實體建立，原料名稱不可重複
    pub fn new(materials: Vec<Material>, compounds: Vec<ChemicalCompound>) -> Result<Self> {
        MaterialKeys::new(materials.iter().map(|m| m.name.clone()).collect())?;

        if let Some(dup) = compounds
            .iter()
            .enumerate()
            .find(|(i, c)| compounds[..*i].iter().any(|prev| prev.name == c.name))
            .map(|(_, c)| c.name)
        {
            return Err(BlendError::Validation(format!("成分約束重複: {}", dup)));
        }

        for material in &materials {
            material.validate_contents()?;
        }

        Ok(Self {
            materials,
            compounds,
        })
    }

    /// 由已解析的表格列建立輸入
    ///
    /// - 沒有名稱的原料列被丟棄
    /// - 名稱缺失或無法識別的成分列被丟棄
    /// - 原料列缺少的成分欄位視為 0
    pub fn from_rows(material_rows: Vec<MaterialRow>, compound_rows: Vec<CompoundRow>) -> Result<Self> {
        let mut compounds = Vec::new();
        for row in compound_rows {
            let Some(label) = row.name.as_deref() else {
                continue;
            };
            let name = match label.parse::<CompoundName>() {
                Ok(name) => name,
                Err(_) => {
                    tracing::debug!("略過無法識別的成分: {}", label);
                    continue;
                }
            };
            compounds.push(ChemicalCompound::new(name, row.low_bound, row.up_bound)?);
        }
        tracing::info!("讀取成分約束 {} 項", compounds.len());

        let mut materials = Vec::new();
        for row in material_rows {
            let Some(name) = row.name.filter(|n| !n.trim().is_empty()) else {
                continue;
            };
            let mut material = Material::new(name, row.wet_price, row.low_bound, row.up_bound)?;
            for compound in CompoundName::ALL {
                let value = row.contents.get(compound.label()).copied().unwrap_or(0.0);
                material = material.with_content(compound, value);
            }
            materials.push(material);
        }
        tracing::info!("讀取原料 {} 項", materials.len());

        Self::new(materials, compounds)
    }

    /// 原料（讀取順序）
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// 成分約束（讀取順序）
    pub fn compounds(&self) -> &[ChemicalCompound] {
        &self.compounds
    }

    /// 按名稱查找原料
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_drops_unnamed_and_unknown() {
        let materials = vec![
            MaterialRow::new("A", 100.0, 30.0, 70.0)
                .with_content("TFe", 50.0)
                .with_content("H2O", 10.0),
            MaterialRow {
                name: None,
                ..MaterialRow::default()
            },
            MaterialRow::new("B", 120.0, 30.0, 70.0).with_content("TFe", 60.0),
        ];
        let compounds = vec![
            CompoundRow::new("TFe", 40.0, 80.0),
            CompoundRow::new("Au", 0.0, 1.0),
            CompoundRow {
                name: None,
                ..CompoundRow::default()
            },
        ];

        let input = InputData::from_rows(materials, compounds).unwrap();

        assert_eq!(input.materials().len(), 2);
        assert_eq!(input.materials()[0].name, "A");
        assert_eq!(input.materials()[1].name, "B");
        assert_eq!(input.compounds().len(), 1);
        assert_eq!(input.compounds()[0].name, CompoundName::TFe);

        let b = input.material("B").unwrap();
        assert_eq!(b.content(CompoundName::TFe), 60.0);
        // 缺少的欄位為 0
        assert_eq!(b.water_fraction(), 0.0);
    }

    #[test]
    fn test_from_rows_rejects_duplicate_material() {
        let materials = vec![
            MaterialRow::new("A", 100.0, 0.0, 100.0),
            MaterialRow::new("A", 90.0, 0.0, 100.0),
        ];
        let err = InputData::from_rows(materials, vec![]).unwrap_err();
        assert!(matches!(err, BlendError::DuplicateMaterial(_)));
    }

    #[test]
    fn test_from_rows_rejects_inverted_bounds() {
        let materials = vec![MaterialRow::new("A", 100.0, 80.0, 20.0)];
        assert!(InputData::from_rows(materials, vec![]).is_err());

        let compounds = vec![CompoundRow::new("SiO2", 6.0, 5.0)];
        assert!(InputData::from_rows(vec![], compounds).is_err());
    }

    #[test]
    fn test_duplicate_compound_rejected() {
        let compounds = vec![
            CompoundRow::new("SiO2", 4.0, 5.0),
            CompoundRow::new("SiO2", 4.5, 5.5),
        ];
        assert!(InputData::from_rows(vec![], compounds).is_err());
    }
}

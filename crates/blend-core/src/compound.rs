//! 化學成分模型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BlendError, Result};

/// 可識別的化學成分
///
/// 成分表與原料表中只有這 20 種成分會被讀取，其中 `H2O` 為水分，
/// `BurningLoss`（燒損）不做水分修正。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompoundName {
    /// 全鐵
    TFe,
    CaO,
    SiO2,
    MgO,
    Al2O3,
    P,
    S,
    V2O5,
    Cr,
    TiO2,
    Zn,
    Ni,
    MnO,
    K2O,
    Na2O,
    Pb,
    CuO,
    /// 水分
    H2O,
    FeO,
    /// 燒損
    #[serde(rename = "烧损", alias = "burning_loss")]
    BurningLoss,
}

impl CompoundName {
    /// 全部可識別成分（固定順序）
    pub const ALL: [CompoundName; 20] = [
        CompoundName::TFe,
        CompoundName::CaO,
        CompoundName::SiO2,
        CompoundName::MgO,
        CompoundName::Al2O3,
        CompoundName::P,
        CompoundName::S,
        CompoundName::V2O5,
        CompoundName::Cr,
        CompoundName::TiO2,
        CompoundName::Zn,
        CompoundName::Ni,
        CompoundName::MnO,
        CompoundName::K2O,
        CompoundName::Na2O,
        CompoundName::Pb,
        CompoundName::CuO,
        CompoundName::H2O,
        CompoundName::FeO,
        CompoundName::BurningLoss,
    ];

    /// 表格欄位使用的標籤
    pub fn label(&self) -> &'static str {
        match self {
            CompoundName::TFe => "TFe",
            CompoundName::CaO => "CaO",
            CompoundName::SiO2 => "SiO2",
            CompoundName::MgO => "MgO",
            CompoundName::Al2O3 => "Al2O3",
            CompoundName::P => "P",
            CompoundName::S => "S",
            CompoundName::V2O5 => "V2O5",
            CompoundName::Cr => "Cr",
            CompoundName::TiO2 => "TiO2",
            CompoundName::Zn => "Zn",
            CompoundName::Ni => "Ni",
            CompoundName::MnO => "MnO",
            CompoundName::K2O => "K2O",
            CompoundName::Na2O => "Na2O",
            CompoundName::Pb => "Pb",
            CompoundName::CuO => "CuO",
            CompoundName::H2O => "H2O",
            CompoundName::FeO => "FeO",
            CompoundName::BurningLoss => "烧损",
        }
    }

    /// 是否為水分
    pub fn is_water(&self) -> bool {
        *self == CompoundName::H2O
    }

    /// 是否為燒損
    pub fn is_burning_loss(&self) -> bool {
        *self == CompoundName::BurningLoss
    }
}

impl fmt::Display for CompoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CompoundName {
    type Err = BlendError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed == "burning_loss" {
            return Ok(CompoundName::BurningLoss);
        }
        CompoundName::ALL
            .iter()
            .copied()
            .find(|c| c.label() == trimmed)
            .ok_or_else(|| BlendError::UnknownCompound(trimmed.to_string()))
    }
}

/// 化學成分的配比約束（混合料中的目標百分比）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalCompound {
    /// 成分名稱
    pub name: CompoundName,

    /// 下限（%）
    pub low_bound: f64,

    /// 上限（%）
    pub up_bound: f64,
}

impl ChemicalCompound {
    /// 創建新的成分約束，要求上下限有限且 `low ≤ high`
    pub fn new(name: CompoundName, low_bound: f64, up_bound: f64) -> Result<Self> {
        if !low_bound.is_finite() || !up_bound.is_finite() {
            return Err(BlendError::Validation(format!(
                "成分 {} 的上下限必須為有限數值: [{}, {}]",
                name, low_bound, up_bound
            )));
        }
        if low_bound > up_bound {
            return Err(BlendError::Validation(format!(
                "成分 {} 的下限 {} 大於上限 {}",
                name, low_bound, up_bound
            )));
        }

        Ok(Self {
            name,
            low_bound,
            up_bound,
        })
    }

    /// 上下限
    pub fn ratio_bounds(&self) -> (f64, f64) {
        (self.low_bound, self.up_bound)
    }
}

impl fmt::Display for ChemicalCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.low_bound, self.up_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("TFe", CompoundName::TFe)]
    #[case("H2O", CompoundName::H2O)]
    #[case(" SiO2 ", CompoundName::SiO2)]
    #[case("烧损", CompoundName::BurningLoss)]
    #[case("burning_loss", CompoundName::BurningLoss)]
    fn test_parse_compound_name(#[case] label: &str, #[case] expected: CompoundName) {
        assert_eq!(label.parse::<CompoundName>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_compound() {
        let err = "Au".parse::<CompoundName>().unwrap_err();
        assert!(matches!(err, BlendError::UnknownCompound(name) if name == "Au"));
    }

    #[test]
    fn test_all_labels_round_trip() {
        assert_eq!(CompoundName::ALL.len(), 20);
        for compound in CompoundName::ALL {
            assert_eq!(compound.label().parse::<CompoundName>().unwrap(), compound);
        }
    }

    #[test]
    fn test_distinguished_compounds() {
        assert!(CompoundName::H2O.is_water());
        assert!(!CompoundName::TFe.is_water());
        assert!(CompoundName::BurningLoss.is_burning_loss());
    }

    #[test]
    fn test_create_compound() {
        let compound = ChemicalCompound::new(CompoundName::SiO2, 4.5, 5.5).unwrap();
        assert_eq!(compound.ratio_bounds(), (4.5, 5.5));
        assert_eq!(compound.to_string(), "SiO2 (4.5, 5.5)");
    }

    #[test]
    fn test_compound_bounds_validation() {
        assert!(ChemicalCompound::new(CompoundName::MgO, 3.0, 2.0).is_err());
        assert!(ChemicalCompound::new(CompoundName::MgO, f64::NAN, 2.0).is_err());
        // 上下限相等是允許的
        assert!(ChemicalCompound::new(CompoundName::MgO, 2.0, 2.0).is_ok());
    }
}

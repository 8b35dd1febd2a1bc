//! 決策向量（原料 → 配比）

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{BlendError, Result};

/// 原料鍵的固定順序
///
/// 每次求解開始時建立一次，之後所有需要平面數值向量的地方都使用同一份順序。
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialKeys {
    names: Arc<[String]>,
    index: Arc<HashMap<String, usize>>,
}

impl MaterialKeys {
    /// 由原料名稱建立順序，名稱不可重複
    pub fn new(names: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(BlendError::DuplicateMaterial(name.clone()));
            }
        }

        Ok(Self {
            names: names.into(),
            index: Arc::new(index),
        })
    }

    /// 原料數量
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 原料在向量中的位置
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// 依序的原料名稱
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// 決策向量：按 [`MaterialKeys`] 順序排列的配比值
#[derive(Debug, Clone, PartialEq)]
pub struct RatioVector {
    keys: MaterialKeys,
    values: Vec<f64>,
}

impl RatioVector {
    /// 以給定順序包裝數值向量，長度必須一致
    pub fn new(keys: MaterialKeys, values: Vec<f64>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(BlendError::Validation(format!(
                "配比向量長度 {} 與原料數量 {} 不一致",
                values.len(),
                keys.len()
            )));
        }
        Ok(Self { keys, values })
    }

    /// 原料的配比值
    pub fn get(&self, name: &str) -> Option<f64> {
        self.keys.position(name).map(|i| self.values[i])
    }

    /// 配比總和
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn keys(&self) -> &MaterialKeys {
        &self.keys
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// 依序迭代 (原料名稱, 配比)
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.keys
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// 序列化為依原料順序排列的 `{名稱: 配比}` 物件
impl Serialize for RatioVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

//! # Blend Core
//!
//! 配礦優化的核心資料模型與類型定義

pub mod compound;
pub mod config;
pub mod input;
pub mod material;
pub mod ratio;

// Re-export 主要類型
pub use compound::{ChemicalCompound, CompoundName};
pub use config::SolverConfig;
pub use input::{CompoundRow, InputData, MaterialRow};
pub use material::Material;
pub use ratio::{MaterialKeys, RatioVector};

/// 配礦錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BlendError {
    #[error("資料驗證失敗: {0}")]
    Validation(String),

    #[error("無可行配比: {0}")]
    Infeasible(String),

    #[error("原料名稱重複: {0}")]
    DuplicateMaterial(String),

    #[error("無法識別的化學成分: {0}")]
    UnknownCompound(String),

    #[error("求解參數無效: {0}")]
    InvalidConfig(String),

    #[error("線性規劃求解器錯誤: {0}")]
    Solver(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BlendError>;

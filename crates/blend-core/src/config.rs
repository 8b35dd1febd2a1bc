//! 求解參數配置

use serde::{Deserialize, Serialize};

use crate::{BlendError, CompoundName, Result};

/// 配礦求解參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// 計價成分（噸成分成本的分母）
    pub target_compound: CompoundName,

    /// 局部求解收斂容差，同時用於全域搜尋的接受判定
    pub solver_tolerance: f64,

    /// 求解後約束檢查的容差
    pub audit_tolerance: f64,

    /// 全域搜尋迭代上限
    pub max_iterations: usize,

    /// 單次局部求解的迭代上限
    pub local_max_iterations: usize,

    /// 連續未改善的已接受迭代次數上限
    pub stagnation_limit: usize,

    /// 解池容量
    pub pool_capacity: usize,

    /// 每次迭代進入解池的機率
    pub pool_admission_probability: f64,

    /// 隨機擾動的初始步長
    pub step_size: f64,

    /// Metropolis 溫度
    pub temperature: f64,

    /// 步長調整間隔（迭代次數）
    pub adaptive_interval: usize,

    /// 目標接受率
    pub target_accept_rate: f64,

    /// 步長調整係數
    pub step_factor: f64,

    /// 隨機種子（None 表示由系統熵產生）
    pub seed: Option<u64>,

    /// 輸出表格的小數位數
    pub decimal_places: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            target_compound: CompoundName::TFe,
            solver_tolerance: 1e-2,
            audit_tolerance: 1e-3,
            max_iterations: 500,
            local_max_iterations: 100,
            stagnation_limit: 50,
            pool_capacity: 3,
            pool_admission_probability: 0.2,
            step_size: 0.5,
            temperature: 1.0,
            adaptive_interval: 50,
            target_accept_rate: 0.5,
            step_factor: 0.9,
            seed: None,
            decimal_places: 4,
        }
    }
}

impl SolverConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 讀取配置，缺少的欄位使用預設值
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置計價成分
    pub fn with_target_compound(mut self, compound: CompoundName) -> Self {
        self.target_compound = compound;
        self
    }

    /// 建構器模式：設置迭代上限
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// 建構器模式：設置停滯上限
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// 建構器模式：設置約束檢查容差
    pub fn with_audit_tolerance(mut self, tolerance: f64) -> Self {
        self.audit_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置解池容量
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// 建構器模式：設置隨機種子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 建構器模式：設置擾動步長
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    /// 檢查參數是否合法
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("solver_tolerance", self.solver_tolerance),
            ("audit_tolerance", self.audit_tolerance),
            ("step_size", self.step_size),
            ("temperature", self.temperature),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(BlendError::InvalidConfig(format!("{} 必須為正數: {}", field, value)));
            }
        }

        for (field, value) in [
            ("pool_admission_probability", self.pool_admission_probability),
            ("target_accept_rate", self.target_accept_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BlendError::InvalidConfig(format!(
                    "{} 必須位於 [0, 1]: {}",
                    field, value
                )));
            }
        }

        if !(self.step_factor > 0.0 && self.step_factor < 1.0) {
            return Err(BlendError::InvalidConfig(format!(
                "step_factor 必須位於 (0, 1): {}",
                self.step_factor
            )));
        }

        for (field, value) in [
            ("local_max_iterations", self.local_max_iterations),
            ("stagnation_limit", self.stagnation_limit),
            ("pool_capacity", self.pool_capacity),
            ("adaptive_interval", self.adaptive_interval),
        ] {
            if value == 0 {
                return Err(BlendError::InvalidConfig(format!("{} 不可為 0", field)));
            }
        }

        Ok(())
    }
}

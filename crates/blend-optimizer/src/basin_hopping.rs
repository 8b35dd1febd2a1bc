//! 全域搜尋：盆地跳躍
//!
//! 每次迭代隨機擾動目前解，以局部求解回到盆地底部，再依約束與 Metropolis 判定是否接受。
//! 搜尋可以逐步推進（[`BasinHopping::step`]）或一次跑完（[`BasinHopping::run`]）。

use rand::Rng;
use serde::Serialize;

use blend_calc::{BlendModel, ConstraintSet};
use blend_core::SolverConfig;

use crate::local::{LocalOutcome, LocalRefiner, ObjectiveMode, RefinerSettings};
use crate::pool::{PoolEntry, SolutionPool};

/// 低於此相對幅度的改善視為數值噪聲，不更新最佳解
const IMPROVEMENT_RTOL: f64 = 1e-9;

/// 搜尋狀態
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchStatus {
    /// 仍在搜尋
    Searching,
    /// 連續多次接受都未改善最佳解
    Stagnated,
    /// 迭代預算用盡
    BudgetExhausted,
    /// 局部求解失敗，搜尋中止
    Failed(String),
}

impl SearchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchStatus::Searching)
    }
}

/// 盆地跳躍參數
#[derive(Debug, Clone, Copy)]
pub struct HoppingSettings {
    pub max_iterations: usize,
    pub stagnation_limit: usize,
    pub step_size: f64,
    pub temperature: f64,
    pub adaptive_interval: usize,
    pub target_accept_rate: f64,
    pub step_factor: f64,
    pub pool_capacity: usize,
    pub pool_admission_probability: f64,
    /// 接受判定的約束容差
    pub tolerance: f64,
}

impl From<&SolverConfig> for HoppingSettings {
    fn from(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            stagnation_limit: config.stagnation_limit,
            step_size: config.step_size,
            temperature: config.temperature,
            adaptive_interval: config.adaptive_interval,
            target_accept_rate: config.target_accept_rate,
            step_factor: config.step_factor,
            pool_capacity: config.pool_capacity,
            pool_admission_probability: config.pool_admission_probability,
            tolerance: config.solver_tolerance,
        }
    }
}

/// 搜尋進度
#[derive(Debug, Clone)]
pub struct SearchState {
    pub current_x: Vec<f64>,
    pub current_objective: f64,
    pub best_x: Vec<f64>,
    pub best_objective: f64,
    /// 最佳解對應的局部求解是否收斂
    pub best_converged: bool,
    pub best_message: String,
    pub iteration: usize,
    pub accepted: usize,
    /// 連續未改善最佳解的已接受迭代次數
    pub stagnation: usize,
    pub step_size: f64,
    pub status: SearchStatus,
}

impl SearchState {
    fn from_initial(outcome: &LocalOutcome, step_size: f64) -> Self {
        let status = if outcome.is_hard_failure() {
            SearchStatus::Failed(outcome.message.clone())
        } else {
            SearchStatus::Searching
        };
        Self {
            current_x: outcome.x.clone(),
            current_objective: outcome.objective,
            best_x: outcome.x.clone(),
            best_objective: outcome.objective,
            best_converged: outcome.converged,
            best_message: outcome.message.clone(),
            iteration: 0,
            accepted: 0,
            stagnation: 0,
            step_size,
            status,
        }
    }
}

/// 搜尋結束時的結果
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_x: Vec<f64>,
    pub best_objective: f64,
    pub best_converged: bool,
    pub message: String,
    pub status: SearchStatus,
    pub iterations: usize,
    pub pool: SolutionPool,
}

impl SearchOutcome {
    /// 正常結束且最佳解的局部求解收斂
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            SearchStatus::Stagnated | SearchStatus::BudgetExhausted
        ) && self.best_converged
    }
}

/// 盆地跳躍搜尋器
pub struct BasinHopping<'a, R: Rng> {
    model: &'a BlendModel,
    constraints: &'a ConstraintSet,
    refiner: LocalRefiner<'a>,
    settings: HoppingSettings,
    rng: R,
    state: SearchState,
    pool: SolutionPool,
}

impl<'a, R: Rng> BasinHopping<'a, R> {
    /// 從種子出發做一次局部求解，作為初始的目前解與最佳解
    pub fn start(
        model: &'a BlendModel,
        constraints: &'a ConstraintSet,
        config: &SolverConfig,
        rng: R,
        seed: &[f64],
    ) -> Self {
        let settings = HoppingSettings::from(config);
        let refiner = LocalRefiner::new(
            model,
            constraints,
            ObjectiveMode::Cost,
            RefinerSettings::default()
                .with_tolerance(config.solver_tolerance)
                .with_max_iterations(config.local_max_iterations),
        );

        let initial = refiner.minimize(seed);
        if initial.converged {
            tracing::debug!("盆地跳躍初始局部解: f = {}", initial.objective);
        } else {
            tracing::warn!(
                "盆地跳躍初始局部求解未收斂: f = {}, {}",
                initial.objective,
                initial.message
            );
        }

        Self {
            model,
            constraints,
            state: SearchState::from_initial(&initial, settings.step_size),
            refiner,
            pool: SolutionPool::new(settings.pool_capacity),
            settings,
            rng,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn pool(&self) -> &SolutionPool {
        &self.pool
    }

    pub fn status(&self) -> &SearchStatus {
        &self.state.status
    }

    /// 調整迭代預算；已因預算結束的搜尋在預算增加後可繼續
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.settings.max_iterations = max_iterations;
        match self.state.status {
            SearchStatus::BudgetExhausted if self.state.iteration < max_iterations => {
                self.state.status = SearchStatus::Searching;
            }
            SearchStatus::Searching if self.state.iteration >= max_iterations => {
                self.state.status = SearchStatus::BudgetExhausted;
            }
            _ => {}
        }
    }

    /// 推進一次迭代；搜尋已結束時不做任何事
    pub fn step(&mut self) -> &SearchStatus {
        if self.state.status.is_terminal() {
            return &self.state.status;
        }
        if self.state.iteration >= self.settings.max_iterations {
            self.state.status = SearchStatus::BudgetExhausted;
            return &self.state.status;
        }

        let step_size = self.state.step_size;
        let trial: Vec<f64> = self
            .state
            .current_x
            .iter()
            .map(|xi| xi + self.rng.gen_range(-step_size..=step_size))
            .collect();

        let outcome = self.refiner.minimize(&trial);
        if outcome.is_hard_failure() {
            tracing::warn!("第 {} 次迭代局部求解失敗: {}", self.state.iteration, outcome.message);
            self.state.iteration += 1;
            self.state.status = SearchStatus::Failed(outcome.message);
            return &self.state.status;
        }
        if !outcome.converged {
            tracing::warn!(
                "第 {} 次迭代局部求解未收斂: f = {}, {}",
                self.state.iteration,
                outcome.objective,
                outcome.message
            );
        }

        let feasible = self
            .constraints
            .is_satisfied(self.model, &outcome.x, self.settings.tolerance);
        let metropolis = self.metropolis(outcome.objective);
        let accepted = feasible && metropolis;

        self.state.iteration += 1;
        if accepted {
            self.state.accepted += 1;
        }
        self.adjust_step_size();

        if accepted {
            self.state.current_x = outcome.x.clone();
            self.state.current_objective = outcome.objective;
            if improves(outcome.objective, self.state.best_objective) {
                tracing::debug!(
                    "第 {} 次迭代找到更佳解: {} -> {}",
                    self.state.iteration,
                    self.state.best_objective,
                    outcome.objective
                );
                self.state.best_x = outcome.x.clone();
                self.state.best_objective = outcome.objective;
                self.state.best_converged = outcome.converged;
                self.state.best_message = outcome.message.clone();
                self.state.stagnation = 0;
            } else {
                self.state.stagnation += 1;
            }
        }

        let draw: f64 = self.rng.gen();
        if accepted && draw < self.settings.pool_admission_probability {
            if let Ok(ratios) = self.model.ratio_vector(outcome.x) {
                self.pool.admit(PoolEntry {
                    ratios,
                    objective: outcome.objective,
                });
            }
        }

        if self.state.stagnation >= self.settings.stagnation_limit {
            tracing::info!("連續 {} 次未改善，停止搜尋", self.state.stagnation);
            self.state.status = SearchStatus::Stagnated;
        } else if self.state.iteration >= self.settings.max_iterations {
            self.state.status = SearchStatus::BudgetExhausted;
        }

        &self.state.status
    }

    /// 推進到搜尋結束
    pub fn run(mut self) -> SearchOutcome {
        while !self.step().is_terminal() {}
        self.finish()
    }

    /// 以目前進度結束搜尋
    pub fn finish(self) -> SearchOutcome {
        tracing::info!(
            "盆地跳躍結束: {:?}，共 {} 次迭代，接受 {} 次",
            self.state.status,
            self.state.iteration,
            self.state.accepted
        );
        let message = match &self.state.status {
            SearchStatus::Failed(message) => message.clone(),
            SearchStatus::Stagnated => format!(
                "Search stagnated after {} iterations; {}",
                self.state.iteration, self.state.best_message
            ),
            SearchStatus::BudgetExhausted => format!(
                "Requested number of iterations ({}) completed; {}",
                self.state.iteration, self.state.best_message
            ),
            SearchStatus::Searching => self.state.best_message.clone(),
        };

        SearchOutcome {
            best_x: self.state.best_x,
            best_objective: self.state.best_objective,
            best_converged: self.state.best_converged,
            message,
            status: self.state.status,
            iterations: self.state.iteration,
            pool: self.pool,
        }
    }

    fn metropolis(&mut self, objective: f64) -> bool {
        let exponent = -(objective - self.state.current_objective) / self.settings.temperature;
        let weight = exponent.min(0.0).exp();
        let draw: f64 = self.rng.gen();
        weight >= draw
    }

    fn adjust_step_size(&mut self) {
        let interval = self.settings.adaptive_interval;
        if interval == 0 || self.state.iteration % interval != 0 {
            return;
        }
        let rate = self.state.accepted as f64 / self.state.iteration as f64;
        if rate > self.settings.target_accept_rate {
            self.state.step_size /= self.settings.step_factor;
        } else {
            self.state.step_size *= self.settings.step_factor;
        }
        tracing::debug!("接受率 {:.3}，步長調整為 {}", rate, self.state.step_size);
    }
}

/// 候選目標值是否明顯優於目前最佳值
fn improves(candidate: f64, best: f64) -> bool {
    candidate < best - IMPROVEMENT_RTOL * best.abs().max(1.0)
}

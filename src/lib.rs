//! # Blend
//!
//! 配礦配比優化：在原料配比上下限與混合料成分上下限內，求噸計價成分成本最低的配比

pub use blend_calc;
pub use blend_core;
pub use blend_optimizer;

pub use blend_core::{
    BlendError, ChemicalCompound, CompoundName, CompoundRow, InputData, Material, MaterialRow,
    RatioVector, Result, SolverConfig,
};
pub use blend_optimizer::{BlendOptimizer, OptimizationResult, SolutionTable};

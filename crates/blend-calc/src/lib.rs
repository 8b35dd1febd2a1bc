//! # Blend Calculation Engine
//!
//! 衍生量計算、約束建構與約束檢查

pub mod audit;
pub mod constraint;
pub mod derived;
pub mod model;

// Re-export 主要類型
pub use audit::{AuditReport, ConstraintAuditor, Violation};
pub use constraint::{
    BoundSide, Constraint, ConstraintBuilder, ConstraintKind, ConstraintSet, ConstraintTarget,
};
pub use derived::{BlendQuantities, DerivedCalculator};
pub use model::BlendModel;

//! # 数据模型模块
//!
//! 定义模拟晶胞和计算结果数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `builders/` 和 `commands/` 使用
//! - 子模块: cell, calculation

pub mod calculation;
pub mod cell;

pub use calculation::{FinalValues, RunSummary};
pub use cell::{Cell, CoordinateSystem, Mobility, Site};

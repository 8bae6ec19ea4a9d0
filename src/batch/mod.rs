//! # 批量处理模块
//!
//! 收集输入文件并行处理，汇总成功、跳过和失败的数量。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/analyze.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};

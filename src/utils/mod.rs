//! # 工具函数模块
//!
//! 提供美化输出、进度条、作业目录准备和 Slurm 脚本生成。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 子模块: output, progress, slurm, staging

pub mod output;
pub mod progress;
pub mod slurm;
pub mod staging;

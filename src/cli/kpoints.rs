//! # kpoints 子命令 CLI 定义
//!
//! k 点网格收敛测试
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/kpoints.rs`

use super::scheduler::SchedulerArgs;
use clap::Args;

/// kpoints 子命令参数
#[derive(Args, Debug)]
pub struct KpointsArgs {
    /// Minimum automatic mesh length
    #[arg(long, default_value_t = 8)]
    pub min: u32,

    /// Maximum automatic mesh length
    #[arg(long, default_value_t = 15)]
    pub max: u32,

    /// Job name
    #[arg(short = 'J', long, default_value = "conv")]
    pub job_name: String,

    #[command(flatten)]
    pub scheduler: SchedulerArgs,
}

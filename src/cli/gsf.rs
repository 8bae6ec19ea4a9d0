//! # gsf 子命令 CLI 定义
//!
//! 广义层错能计算，包含子命令：
//! - `create`: 构建 fcc 堆垛平板
//! - `fault`: 生成层错位移序列
//! - `run`: 准备并提交层错结构的计算
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/gsf.rs`

use super::scheduler::SchedulerArgs;
use crate::builders::stacking::TWIN_SEQUENCE;
use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// GSF 主命令
// ─────────────────────────────────────────────────────────────

/// gsf 主命令参数
#[derive(Args, Debug)]
pub struct GsfArgs {
    #[command(subcommand)]
    pub command: GsfCommands,
}

/// gsf 子命令
#[derive(Subcommand, Debug)]
pub enum GsfCommands {
    /// Build an fcc slab stacked along [111]
    Create(CreateArgs),

    /// Generate the shifted structures along the fault pathway
    Fault(FaultArgs),

    /// Stage and submit calculations for the fault structures
    Run(RunArgs),
}

// ─────────────────────────────────────────────────────────────
// 平板构建
// ─────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Element symbol
    #[arg(short, long, default_value = "Cu")]
    pub element: String,

    /// Lattice constant (Å)
    #[arg(short = 'a', long, default_value_t = 3.6355)]
    pub lattice_constant: f64,

    /// Periodicity along x [1-10]
    #[arg(long, default_value_t = 1)]
    pub nx: usize,

    /// Periodicity along y [11-2]
    #[arg(long, default_value_t = 1)]
    pub ny: usize,

    /// Stacking sequence of A, B and C layers
    #[arg(short, long, default_value = TWIN_SEQUENCE)]
    pub sequence: String,

    /// Output POSCAR
    #[arg(short, long, default_value = "POSCAR")]
    pub output: PathBuf,
}

// ─────────────────────────────────────────────────────────────
// 层错位移
// ─────────────────────────────────────────────────────────────

/// 位移序列参数（fault 与 run 共用）
#[derive(Args, Debug, Clone)]
pub struct PathwayArgs {
    /// Number of shifts per stacking fault
    #[arg(long, default_value_t = 10)]
    pub shifts: usize,

    /// Stop after the intrinsic fault instead of continuing to the extrinsic fault
    #[arg(long, default_value_t = false)]
    pub isf_only: bool,
}

#[derive(Args, Debug)]
pub struct FaultArgs {
    /// Slab POSCAR to shift
    #[arg(short, long, default_value = "POSCAR")]
    pub input: PathBuf,

    /// Directory for the POSCAR_<displacement> files (default: next to the input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub pathway: PathwayArgs,
}

// ─────────────────────────────────────────────────────────────
// 作业提交
// ─────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub pathway: PathwayArgs,

    /// Job name
    #[arg(short = 'J', long, default_value = "GSF")]
    pub job_name: String,

    #[command(flatten)]
    pub scheduler: SchedulerArgs,
}

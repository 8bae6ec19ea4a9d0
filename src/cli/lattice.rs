//! # lattice 子命令 CLI 定义
//!
//! 晶格常数扫描（基态搜索）
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/lattice.rs`

use super::scheduler::SchedulerArgs;
use clap::Args;
use std::path::PathBuf;

/// lattice 子命令参数
#[derive(Args, Debug)]
pub struct LatticeArgs {
    /// Minimum lattice parameter (Å)
    #[arg(long, default_value_t = 2.0)]
    pub a_min: f64,

    /// Maximum lattice parameter (Å)
    #[arg(long, default_value_t = 4.0)]
    pub a_max: f64,

    /// Number of lattice parameters
    #[arg(long, default_value_t = 7)]
    pub points: usize,

    /// Template structure inside the inputs directory (POSCAR or bestsqs.out)
    #[arg(long, default_value = "POSCAR")]
    pub structure: PathBuf,

    /// Run a relaxation (INCAR_relax) before the static calculation
    #[arg(long, default_value_t = false)]
    pub relax: bool,

    /// Run a second relaxation (INCAR_cont) from CONTCAR
    #[arg(long, default_value_t = false, requires = "relax")]
    pub re_relax: bool,

    /// Job name
    #[arg(short = 'J', long, default_value = "LP")]
    pub job_name: String,

    #[command(flatten)]
    pub scheduler: SchedulerArgs,
}

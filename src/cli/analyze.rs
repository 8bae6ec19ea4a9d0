//! # analyze 子命令 CLI 定义
//!
//! 汇总一组 VASP 计算的 OUTCAR，可选 Birch-Murnaghan 拟合
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze.rs`

use clap::Args;
use std::path::PathBuf;

/// analyze 子命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Results directory whose subdirectories hold OUTCAR files
    pub results: PathBuf,

    /// Fit final volumes and energies to the Birch-Murnaghan equation of state
    #[arg(long, default_value_t = false)]
    pub fit: bool,

    /// Directory for <job>_data.log and <job>_data.csv
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}

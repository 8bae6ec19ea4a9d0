//! # convert 子命令 CLI 定义
//!
//! 将 ATAT mcsqs 输出 (bestsqs.out) 转换为 POSCAR
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// SQS file or directory containing SQS files
    #[arg(short, long, default_value = "bestsqs.out")]
    pub input: PathBuf,

    /// Output POSCAR (single file) or output directory (directory input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Glob pattern for input files (comma-separated)
    #[arg(short, long, default_value = "bestsqs*.out")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

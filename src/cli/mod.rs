//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: SQS -> POSCAR
//! - `analyze`: OUTCAR 汇总与状态方程拟合
//! - `gsf`: 广义层错（嵌套子命令）
//!   - `create`: 构建堆垛平板
//!   - `fault`: 生成层错结构
//!   - `run`: 准备并提交计算
//! - `lattice`: 晶格常数扫描
//! - `kpoints`: k 点收敛测试
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用（经 `lib.rs` 导出）
//! - 子模块: analyze, convert, gsf, kpoints, lattice, scheduler

pub mod analyze;
pub mod convert;
pub mod gsf;
pub mod kpoints;
pub mod lattice;
pub mod scheduler;

use clap::{Parser, Subcommand};

/// Cellforge - VASP 晶胞与作业工具箱
#[derive(Parser, Debug)]
#[command(name = "cellforge")]
#[command(version)]
#[command(about = "Build, convert and batch VASP crystal cells", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert ATAT bestsqs.out files to POSCAR
    Convert(convert::ConvertArgs),

    /// Summarize OUTCAR results and optionally fit an equation of state
    Analyze(analyze::AnalyzeArgs),

    /// Generalized stacking-fault structures and calculations
    Gsf(gsf::GsfArgs),

    /// Stage a lattice-parameter sweep
    Lattice(lattice::LatticeArgs),

    /// Stage a k-point convergence test
    Kpoints(kpoints::KpointsArgs),
}

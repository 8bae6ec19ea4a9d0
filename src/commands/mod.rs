//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用（经 `lib.rs` 导出）
//! - 使用 `cli/`, `parsers/`, `models/`, `builders/`, `utils/`
//! - 子模块: analyze, convert, gsf, kpoints, lattice

pub mod analyze;
pub mod convert;
pub mod gsf;
pub mod kpoints;
pub mod lattice;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Analyze(args) => analyze::execute(args),
        Commands::Gsf(args) => gsf::execute(args),
        Commands::Lattice(args) => lattice::execute(args),
        Commands::Kpoints(args) => kpoints::execute(args),
    }
}

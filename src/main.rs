//! # cellforge 命令行入口
//!
//! ## 依赖关系
//! - 使用 `cli/` 解析参数，`commands/` 执行

use cellforge::cli::Cli;
use cellforge::{commands, utils};
use clap::Parser;

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

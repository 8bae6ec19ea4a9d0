//! # VASP KPOINTS 生成
//!
//! 生成全自动 (Auto) 模式的 KPOINTS 文件，只需一个网格长度参数。
//!
//! ## 依赖关系
//! - 被 `commands/kpoints.rs` 使用

use crate::error::{CellforgeError, Result};
use std::fs;
use std::path::Path;

/// 全自动 k 点网格文件内容
pub fn to_auto_kpoints_string(length: u32) -> String {
    format!("Automatic mesh\n0\nAuto\n{}\n", length)
}

/// 写入全自动 KPOINTS 文件
pub fn write_auto_kpoints_file(length: u32, path: &Path) -> Result<()> {
    fs::write(path, to_auto_kpoints_string(length)).map_err(|e| CellforgeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

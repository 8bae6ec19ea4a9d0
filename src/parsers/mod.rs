//! # 解析器模块
//!
//! 提供结构文件 (POSCAR, bestsqs.out) 和 VASP 输出 (OUTCAR) 的读写。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `builders/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, sqs, outcar, kpoints

pub mod kpoints;
pub mod outcar;
pub mod poscar;
pub mod sqs;

use crate::error::{CellforgeError, Result};
use crate::models::Cell;
use std::path::Path;

/// 从文件名推断格式并解析
pub fn parse_structure_file(path: &Path) -> Result<Cell> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if name.ends_with(".out") && name.contains("sqs") {
        sqs::read_sqs_file(path)
    } else if name.starts_with("POSCAR") || name.starts_with("CONTCAR") {
        poscar::read_poscar_file(path)
    } else {
        Err(CellforgeError::UnsupportedFormat(format!(
            "Cannot determine format for: {}",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension() {
        let err = parse_structure_file(Path::new("structure.cif")).unwrap_err();
        assert!(matches!(err, CellforgeError::UnsupportedFormat(_)));
    }
}

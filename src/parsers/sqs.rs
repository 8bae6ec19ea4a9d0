//! # ATAT bestsqs.out 格式解析器
//!
//! 读取 ATAT `mcsqs` 输出的特殊准随机结构 (SQS)。
//!
//! ## bestsqs.out 格式说明
//! ```text
//! s11 s12 s13            # scaling matrix S (3 lines)
//! s21 s22 s23
//! s31 s32 s33
//! b11 b12 b13            # lattice basis B (3 lines)
//! b21 b22 b23
//! b31 b32 b33
//! x y z Element          # Cartesian position + symbol, one per atom
//! ...
//! ```
//!
//! 有效晶格向量为 `B · S`，缩放因子固定为 1.0。笛卡尔坐标通过
//! 未缩放基矢的转置逆 `(Bᵀ)⁻¹` 转换为分数坐标。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `commands/convert.rs` 使用
//! - 使用 `models/cell.rs`
//! - 使用 `nalgebra` 求逆

use crate::error::{CellforgeError, Result};
use crate::models::{Cell, Site};
use nalgebra::{Matrix3, Vector3};
use std::fs;
use std::path::Path;

/// 读取 bestsqs.out 文件
pub fn read_sqs_file(path: &Path) -> Result<Cell> {
    let content = fs::read_to_string(path).map_err(|e| CellforgeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sqs_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 bestsqs.out 格式
pub fn parse_sqs_content(content: &str, source: &str) -> Result<Cell> {
    let fail = |reason: String| CellforgeError::parse("sqs", source, reason);
    let lines: Vec<&str> = content.trim_end().lines().collect();

    if lines.len() < 6 {
        return Err(fail(format!(
            "File too short ({} lines, need at least 6)",
            lines.len()
        )));
    }

    let scaling = parse_matrix(&lines[0..3]).ok_or_else(|| {
        fail("Invalid scaling matrix in lines 1-3".to_string())
    })?;
    let basis = parse_matrix(&lines[3..6])
        .ok_or_else(|| fail("Invalid lattice basis in lines 4-6".to_string()))?;

    let to_direct = basis
        .transpose()
        .try_inverse()
        .ok_or_else(|| fail("Lattice basis is singular".to_string()))?;
    let lattice = basis * scaling;

    let mut elements: Vec<String> = Vec::new();
    let mut sites: Vec<Vec<Site>> = Vec::new();

    for (offset, line) in lines[6..].iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(fail(format!(
                "Expected 'x y z element' at line {}",
                offset + 7
            )));
        }

        let mut cart = [0.0; 3];
        for (c, tok) in cart.iter_mut().zip(&tokens[..3]) {
            *c = tok.parse().map_err(|_| {
                fail(format!("Invalid coordinate '{}' at line {}", tok, offset + 7))
            })?;
        }
        let direct = to_direct * Vector3::from(cart);

        let symbol = tokens[3];
        let group = match elements.iter().position(|e| e == symbol) {
            Some(g) => g,
            None => {
                elements.push(symbol.to_string());
                sites.push(Vec::new());
                elements.len() - 1
            }
        };
        sites[group].push(Site::new([direct.x, direct.y, direct.z], offset));
    }

    let total: usize = sites.iter().map(Vec::len).sum();

    let mut cell = Cell::new();
    cell.set_header(format!("{} {} atom", elements.concat(), total));
    cell.set_lattice_matrix(to_rows(&lattice));
    cell.replace_state(elements, sites, false);

    Ok(cell)
}

/// 解析 3 行 3 列矩阵（每行取前三个字段，行向量）
fn parse_matrix(lines: &[&str]) -> Option<Matrix3<f64>> {
    let mut values = [0.0; 9];
    for (row, line) in lines.iter().enumerate() {
        let mut parts = line.split_whitespace();
        for col in 0..3 {
            values[row * 3 + col] = parts.next()?.parse().ok()?;
        }
    }
    Some(Matrix3::from_row_slice(&values))
}

fn to_rows(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    let mut rows = [[0.0; 3]; 3];
    for (i, row) in rows.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            *v = m[(i, j)];
        }
    }
    rows
}

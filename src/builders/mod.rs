//! # 结构批量生成模块
//!
//! 基于 `Cell` 的编辑接口生成结构变体。
//!
//! ## 功能
//! - fcc 堆垛序列建模与层错位移
//! - 等间距参数序列
//!
//! ## 依赖关系
//! - 被 `commands/gsf.rs`, `commands/lattice.rs` 调用
//! - 使用 `models/cell.rs`
//! - 子模块: stacking

pub mod stacking;

/// 闭区间 [start, stop] 上的 `n` 个等间距点
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(0.0, 1.0, 11);
        assert_eq!(v.len(), 11);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[10], 1.0);
        assert!((v[3] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_linspace_degenerate() {
        assert!(linspace(2.0, 4.0, 0).is_empty());
        assert_eq!(linspace(2.0, 4.0, 1), vec![2.0]);
    }
}

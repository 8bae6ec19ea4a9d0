//! # 状态方程拟合模块
//!
//! 将一组 (体积, 能量) 数据拟合到 Birch-Murnaghan 状态方程。
//!
//! ## 功能
//! - 二次多项式初值估计
//! - Levenberg-Marquardt 最小二乘精修
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `nalgebra` 求解法方程
//! - 子模块: birch

pub mod birch;

pub use birch::{fit_birch_murnaghan, BirchParams};

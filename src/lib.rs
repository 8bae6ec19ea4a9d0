//! # Cellforge - VASP 晶胞与作业工具箱
//!
//! 读写 POSCAR 晶胞，转换 SQS 结构，构建层错模型，
//! 批量准备 VASP 计算并汇总结果。
//!
//! `models` 与 `parsers` 提供晶胞读写与编辑接口，供其他程序直接调用；
//! 命令行入口见 `main.rs`。
//!
//! ## 子命令
//! - `convert`  - bestsqs.out -> POSCAR
//! - `analyze`  - OUTCAR 汇总与 Birch-Murnaghan 拟合
//! - `gsf`      - 广义层错结构与计算
//! - `lattice`  - 晶格常数扫描
//! - `kpoints`  - k 点收敛测试
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (POSCAR / SQS / OUTCAR / KPOINTS)
//!   │     ├── builders/  (堆垛与层错结构)
//!   │     ├── eos/       (状态方程拟合)
//!   │     ├── batch/     (并行批处理)
//!   │     └── models/    (晶胞与计算结果)
//!   ├── utils/      (输出、进度条、作业脚本)
//!   └── error.rs    (错误处理)
//! ```

pub mod batch;
pub mod builders;
pub mod cli;
pub mod commands;
pub mod eos;
pub mod error;
pub mod models;
pub mod parsers;
pub mod utils;

pub use error::{CellforgeError, Result};
pub use models::{Cell, CoordinateSystem, Mobility, Site};

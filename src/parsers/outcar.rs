//! # VASP OUTCAR 解析器
//!
//! 解析 VASP 计算输出文件 OUTCAR，提取每个离子步的能量、体积、
//! 晶格常数、压力和 Pulay 应力，以及不可约 k 点数和 CPU 时间。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 使用
//! - 使用 `models/calculation.rs`

use crate::error::{CellforgeError, Result};
use crate::models::RunSummary;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const ENERGY_MARKER: &str = "FREE ENERGIE OF THE ION-ELECTRON SYSTEM (eV)";
const BASIS_MARKER: &str = "VOLUME and BASIS-vectors are now :";

/// 解析 VASP OUTCAR 文件
pub fn parse_outcar(path: &Path, run_name: &str) -> Result<RunSummary> {
    let file = File::open(path).map_err(|e| CellforgeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let lines = BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|e| CellforgeError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(parse_outcar_lines(&lines, run_name))
}

/// 从 OUTCAR 行序列提取结果
pub fn parse_outcar_lines<S: AsRef<str>>(lines: &[S], run_name: &str) -> RunSummary {
    // "external pressure =       -1.23 kB  Pullay stress =        0.00 kB"
    let pressure_re =
        Regex::new(r"external pressure\s*=\s*(\S+)\s*kB\s*Pullay stress\s*=\s*(\S+)\s*kB").unwrap();
    // "Total CPU time used (sec):       39.882"
    let time_re = Regex::new(r"Total CPU time used \(sec\):\s*(\S+)").unwrap();

    let mut run = RunSummary::new(run_name);
    let line_at = |i: usize| lines.get(i).map(|l| l.as_ref());

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();

        if line.contains(ENERGY_MARKER) {
            // 虚线、TOTEN、空行之后:
            // "energy  without entropy=  -14.49  energy(sigma->0) =  -14.49"
            if let Some(val) = line_at(i + 4).and_then(|l| nth_float(l, 6)) {
                run.energies.push(val);
            }
        } else if line.contains(BASIS_MARKER) {
            // "volume of cell :       44.21"
            if let Some(val) = line_at(i + 3).and_then(|l| nth_float(l, 4)) {
                run.volumes.push(val);
            }
            // "length of vectors" 下一行的 |a| |b| |c|
            if let Some(abc) = line_at(i + 10).and_then(first_three_floats) {
                run.lattice_lengths.push(abc);
            }
        } else if let Some(caps) = pressure_re.captures(line) {
            if let (Ok(p), Ok(s)) = (caps[1].parse(), caps[2].parse()) {
                run.pressures.push(p);
                run.pulay_stresses.push(s);
            }
        } else if line.contains("irreducible") {
            // "Found     10 irreducible k-points:"
            if let Some(n) = line
                .split_whitespace()
                .nth(1)
                .and_then(|s| s.parse::<usize>().ok())
            {
                run.irreducible_kpoints = Some(n);
            }
        } else if let Some(caps) = time_re.captures(line) {
            if let Ok(t) = caps[1].parse() {
                run.cpu_time = Some(t);
            }
        }
    }

    run
}

fn nth_float(line: &str, n: usize) -> Option<f64> {
    line.split_whitespace().nth(n)?.parse().ok()
}

fn first_three_floats(line: &str) -> Option<[f64; 3]> {
    let mut parts = line.split_whitespace().map(|s| s.parse::<f64>());
    Some([
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
    ])
}

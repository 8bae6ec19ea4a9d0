//! # analyze 命令实现
//!
//! 汇总一个结果目录下各计算的 OUTCAR。
//!
//! ## 功能
//! - 并行解析每个子目录的 OUTCAR
//! - 逐离子步表格（全部为静态计算时省略）与最终值表格
//! - 报告追加到 `<job>_data.log`，最终值写入 `<job>_data.csv`
//! - 可选 Birch-Murnaghan 状态方程拟合
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 使用 `parsers/outcar.rs`, `eos/`
//! - 使用 `batch/runner.rs` 并行解析

use crate::batch::BatchRunner;
use crate::cli::analyze::AnalyzeArgs;
use crate::eos::{fit_birch_murnaghan, BirchParams};
use crate::error::{CellforgeError, Result};
use crate::models::calculation::FinalValuesRecord;
use crate::models::{FinalValues, RunSummary};
use crate::parsers::outcar;
use crate::utils::output;
use crate::utils::staging::ensure_dir;

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 逐离子步表格行
#[derive(Debug, Clone, Tabled)]
struct StepRow {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "E0 (eV)")]
    energy: String,
    #[tabled(rename = "Volume (Å³)")]
    volume: String,
    #[tabled(rename = "a (Å)")]
    a: String,
    #[tabled(rename = "b (Å)")]
    b: String,
    #[tabled(rename = "c (Å)")]
    c: String,
    #[tabled(rename = "Pressure (kB)")]
    pressure: String,
    #[tabled(rename = "Pulay stress (kB)")]
    pulay: String,
}

/// 最终值表格行
#[derive(Debug, Clone, Tabled)]
struct FinalRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "E0 (eV)")]
    energy: String,
    #[tabled(rename = "Volume (Å³)")]
    volume: String,
    #[tabled(rename = "a (Å)")]
    a: String,
    #[tabled(rename = "b (Å)")]
    b: String,
    #[tabled(rename = "c (Å)")]
    c: String,
    #[tabled(rename = "Pressure (kB)")]
    pressure: String,
    #[tabled(rename = "Pulay stress (kB)")]
    pulay: String,
    #[tabled(rename = "Irr k-points")]
    kpoints: String,
    #[tabled(rename = "Time (s)")]
    time: String,
}

impl From<&FinalValues> for FinalRow {
    fn from(v: &FinalValues) -> Self {
        let abc = v.lattice_lengths;
        FinalRow {
            name: v.name.clone(),
            energy: fmt_value(v.energy, 6),
            volume: fmt_value(v.volume, 4),
            a: fmt_value(abc.map(|l| l[0]), 5),
            b: fmt_value(abc.map(|l| l[1]), 5),
            c: fmt_value(abc.map(|l| l[2]), 5),
            pressure: fmt_value(v.pressure, 2),
            pulay: fmt_value(v.pulay_stress, 2),
            kpoints: v
                .irreducible_kpoints
                .map(|k| k.to_string())
                .unwrap_or_else(|| "-".to_string()),
            time: fmt_value(v.cpu_time, 1),
        }
    }
}

/// 执行 analyze 命令
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    output::print_header("Analyzing VASP Results");

    if !args.results.is_dir() {
        return Err(CellforgeError::DirectoryNotFound {
            path: args.results.display().to_string(),
        });
    }

    let job = job_name(&args.results);
    let dirs = run_directories(&args.results)?;
    output::print_info(&format!(
        "Found {} subdirectories in '{}'",
        dirs.len(),
        args.results.display()
    ));

    let runner = BatchRunner::new(args.jobs);
    let parsed = runner.map(&dirs, "Parsing OUTCAR", |dir| parse_run(dir))?;

    let mut runs = Vec::new();
    for (dir, result) in dirs.iter().zip(parsed) {
        match result {
            Some(Ok(run)) => runs.push(run),
            Some(Err(e)) => output::print_error(&e.to_string()),
            None => output::print_warning(&format!("No OUTCAR in {}", dir.display())),
        }
    }

    if runs.is_empty() {
        output::print_warning("No OUTCAR files to analyze");
        return Ok(());
    }

    let report = render_report(&runs);
    let finals: Vec<FinalValues> = runs.iter().map(RunSummary::final_values).collect();
    print!("{}", report);

    ensure_dir(&args.output_dir)?;
    let log_path = args.output_dir.join(format!("{}_data.log", job));
    append_log(&log_path, &report)?;
    let csv_path = args.output_dir.join(format!("{}_data.csv", job));
    write_csv(&csv_path, &finals)?;

    // 拟合失败不影响已写出的表格
    if args.fit {
        match render_fit(&finals) {
            Ok(fit) => {
                print!("{}", fit);
                append_log(&log_path, &fit)?;
            }
            Err(e) => output::print_warning(&format!("Skipping fit: {}", e)),
        }
    }

    output::print_separator();
    output::print_done(&format!(
        "Analyzed {} runs; appended '{}', wrote '{}'",
        runs.len(),
        log_path.display(),
        csv_path.display()
    ));

    Ok(())
}

/// 结果目录名去掉 `_results` 作为作业名
fn job_name(results: &Path) -> String {
    let name = results
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            fs::canonicalize(results)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "analysis".to_string());
    name.replace("_results", "")
}

/// 按名称排序的直接子目录（跳过隐藏目录）
fn run_directories(results: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(results).map_err(|e| CellforgeError::FileReadError {
        path: results.display().to_string(),
        source: e,
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// 解析单个计算目录，无 OUTCAR 时返回 None
fn parse_run(dir: &Path) -> Option<Result<RunSummary>> {
    let outcar_path = dir.join("OUTCAR");
    if !outcar_path.is_file() {
        return None;
    }
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(outcar::parse_outcar(&outcar_path, &name))
}

fn fmt_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

/// 渲染报告正文
fn render_report(runs: &[RunSummary]) -> String {
    let mut s = String::new();

    if runs.iter().all(|r| r.ionic_steps() <= 1) {
        s.push_str("All static runs\n\n");
    } else {
        for run in runs {
            s.push_str(&render_run(run));
        }
    }

    let rows: Vec<FinalRow> = runs
        .iter()
        .map(|r| FinalRow::from(&r.final_values()))
        .collect();
    let _ = writeln!(s, "Final values");
    let _ = writeln!(s, "{}\n", Table::new(&rows));
    s
}

/// 单个计算的逐离子步表格
fn render_run(run: &RunSummary) -> String {
    let steps = [
        run.energies.len(),
        run.volumes.len(),
        run.lattice_lengths.len(),
        run.pressures.len(),
    ]
    .into_iter()
    .max()
    .unwrap_or(0);

    let rows: Vec<StepRow> = (0..steps)
        .map(|i| {
            let abc = run.lattice_lengths.get(i).copied();
            StepRow {
                step: i + 1,
                energy: fmt_value(run.energies.get(i).copied(), 6),
                volume: fmt_value(run.volumes.get(i).copied(), 4),
                a: fmt_value(abc.map(|l| l[0]), 5),
                b: fmt_value(abc.map(|l| l[1]), 5),
                c: fmt_value(abc.map(|l| l[2]), 5),
                pressure: fmt_value(run.pressures.get(i).copied(), 2),
                pulay: fmt_value(run.pulay_stresses.get(i).copied(), 2),
            }
        })
        .collect();

    let mut s = String::new();
    let _ = writeln!(s, "{}", run.name);
    let _ = writeln!(s, "{}", Table::new(&rows));
    let _ = writeln!(
        s,
        "Irreducible k-points: {}",
        run.irreducible_kpoints
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(s, "Ionic steps: {}", run.ionic_steps());
    let _ = writeln!(s, "Time: {} s\n", fmt_value(run.cpu_time, 1));
    s
}

/// 拟合最终 (体积, 能量) 并渲染结果
fn render_fit(finals: &[FinalValues]) -> Result<String> {
    let (volumes, energies): (Vec<f64>, Vec<f64>) = finals
        .iter()
        .filter_map(|f| Some((f.volume?, f.energy?)))
        .unzip();

    let params = fit_birch_murnaghan(&volumes, &energies)?;
    Ok(format_fit(&params))
}

fn format_fit(params: &BirchParams) -> String {
    let mut s = String::from("Birch-Murnaghan fit\n");
    let _ = writeln!(s, "Minimum energy:\t{:.6}", params.e0);
    let _ = writeln!(s, "Minimum volume:\t{:.6}", params.v0);
    let _ = writeln!(s, "Cube root:\t{:.6}", params.cube_root_volume());
    let _ = writeln!(s, "Bulk modulus:\t{:.6}\n", params.bulk_modulus_gpa());
    s
}

fn append_log(path: &Path, report: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CellforgeError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
    file.write_all(report.as_bytes())
        .map_err(|e| CellforgeError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
}

fn write_csv(path: &Path, finals: &[FinalValues]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for f in finals {
        wtr.serialize(FinalValuesRecord::from(f))?;
    }
    wtr.flush().map_err(|e| CellforgeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

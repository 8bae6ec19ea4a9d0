//! # lattice 命令实现
//!
//! 晶格常数扫描：对每个晶格常数写出缩放后的 POSCAR，
//! 准备计算目录，生成弛豫/再弛豫/静态多阶段提交脚本。
//!
//! ## 依赖关系
//! - 使用 `cli/lattice.rs` 定义的参数
//! - 使用 `parsers/`, `builders/linspace`
//! - 使用 `utils/staging.rs`, `utils/slurm.rs`

use crate::builders::linspace;
use crate::cli::lattice::LatticeArgs;
use crate::error::{CellforgeError, Result};
use crate::parsers::{self, poscar};
use crate::utils::slurm::Stage;
use crate::utils::staging::{self, JobPlan};
use crate::utils::{output, progress};

/// 运行所需的输入文件
fn required_inputs(relax: bool, re_relax: bool) -> Vec<&'static str> {
    let mut files = vec!["INCAR_static", "KPOINTS", "POTCAR"];
    if relax {
        files.push("INCAR_relax");
    }
    if re_relax {
        files.push("INCAR_cont");
    }
    files
}

fn stages(relax: bool, re_relax: bool) -> Vec<Stage> {
    let mut stages = Vec::new();
    if relax {
        stages.push(Stage::Relax);
        if re_relax {
            stages.push(Stage::ReRelax);
        }
    }
    stages.push(Stage::Static);
    stages
}

/// 执行 lattice 命令
pub fn execute(args: LatticeArgs) -> Result<()> {
    output::print_header("Lattice Parameter Sweep");

    if args.points == 0 {
        return Err(CellforgeError::InvalidRange(
            "--points must be at least 1".to_string(),
        ));
    }
    if !(args.a_min > 0.0 && args.a_max >= args.a_min) {
        return Err(CellforgeError::InvalidRange(format!(
            "lattice parameters {} .. {}",
            args.a_min, args.a_max
        )));
    }

    let sched = &args.scheduler;
    let relax = args.relax;
    let re_relax = args.relax && args.re_relax;
    let inputs = required_inputs(relax, re_relax);
    staging::require_inputs(&sched.inputs, &inputs)?;

    let template = parsers::parse_structure_file(&sched.inputs.join(&args.structure))?;
    let values = linspace(args.a_min, args.a_max, args.points);
    output::print_info(&format!(
        "a values: {}",
        values
            .iter()
            .map(|a| format!("{:.5}", a))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let pb = progress::create_staging_bar(values.len() as u64);
    let mut dirs = Vec::with_capacity(values.len());
    for a in &values {
        let name = format!("{}_{:.5}", args.job_name, a);
        pb.set_message(name.clone());

        let mut cell = template.clone();
        cell.set_scale(*a)?;

        let dir = sched.work_dir.join(&name);
        staging::ensure_dir(&dir)?;
        poscar::write_poscar_file(&cell, &dir.join("POSCAR"))?;
        staging::copy_inputs(&sched.inputs, &inputs, &dir)?;

        dirs.push(name);
        pb.inc(1);
    }
    pb.finish_and_clear();
    output::print_info(&format!(
        "Staged {} directories in '{}'",
        dirs.len(),
        sched.work_dir.display()
    ));

    let plan = JobPlan {
        config: sched.to_config(&args.job_name),
        work_dir: sched.work_dir.clone(),
        results_dir: sched.results_dir.clone(),
        dirs,
        stages: stages(relax, re_relax),
    };
    plan.finish(&sched.inputs, sched.submit)?;
    Ok(())
}

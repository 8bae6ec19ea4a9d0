//! # gsf 命令实现
//!
//! 广义层错能 (GSFE) 工作流。
//!
//! ## 功能
//! - `create`: 按堆垛序列写出 fcc 平板 POSCAR
//! - `fault`: 沿层错路径生成 `POSCAR_<位移>` 序列
//! - `run`: 为每个位移结构准备计算目录并生成提交脚本
//!
//! ## 依赖关系
//! - 使用 `cli/gsf.rs` 定义的参数
//! - 使用 `builders/stacking.rs`, `parsers/poscar.rs`
//! - 使用 `utils/staging.rs`, `utils/slurm.rs`

use crate::builders::linspace;
use crate::builders::stacking::{self, fault_file_name};
use crate::cli::gsf::{CreateArgs, FaultArgs, GsfArgs, GsfCommands, PathwayArgs, RunArgs};
use crate::error::{CellforgeError, Result};
use crate::parsers::poscar;
use crate::utils::slurm::Stage;
use crate::utils::staging::{self, JobPlan};
use crate::utils::{output, progress};

use std::fs;
use std::path::Path;

const FAULT_PREFIX: &str = "POSCAR";
const RUN_INPUTS: [&str; 3] = ["INCAR", "KPOINTS", "POTCAR"];

/// 执行 gsf 命令
pub fn execute(args: GsfArgs) -> Result<()> {
    match args.command {
        GsfCommands::Create(args) => create(args),
        GsfCommands::Fault(args) => fault(args),
        GsfCommands::Run(args) => run(args),
    }
}

/// 位移序列 linspace(0, 1, shifts + 1)
fn displacements(pathway: &PathwayArgs) -> Result<Vec<f64>> {
    if pathway.shifts == 0 {
        return Err(CellforgeError::InvalidArgument(
            "--shifts must be at least 1".to_string(),
        ));
    }
    Ok(linspace(0.0, 1.0, pathway.shifts + 1))
}

/// 路径上所有结构的累计位移（ESF 段记为 d + 1）
fn pathway_totals(pathway: &PathwayArgs) -> Result<Vec<f64>> {
    let disps = displacements(pathway)?;
    let mut totals = disps.clone();
    if !pathway.isf_only {
        totals.extend(disps.iter().skip(1).map(|d| d + 1.0));
    }
    Ok(totals)
}

fn create(args: CreateArgs) -> Result<()> {
    output::print_header("Building fcc Stacking Slab");

    let cell = stacking::build_fcc_slab(
        &args.element,
        args.lattice_constant,
        args.nx,
        args.ny,
        &args.sequence,
    )?;
    poscar::write_poscar_file(&cell, &args.output)?;

    output::print_success(&format!(
        "{} {} atoms, {} layers ({}) -> {}",
        args.element,
        cell.total_atoms(),
        args.sequence.len(),
        args.sequence,
        args.output.display()
    ));
    Ok(())
}

fn fault(args: FaultArgs) -> Result<()> {
    output::print_header("Generating Stacking-Fault Structures");

    let disps = displacements(&args.pathway)?;
    let mut cell = poscar::read_poscar_file(&args.input)?;
    let info = stacking::wrap_and_index_layers(&mut cell)?;
    poscar::write_poscar_file(&cell, &args.input)?;

    output::print_info(&format!(
        "{} layers, ny = {}, {} shifts ({})",
        info.z_levels.len(),
        info.ny,
        args.pathway.shifts,
        if args.pathway.isf_only {
            "ISF only"
        } else {
            "full pathway"
        }
    ));

    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    staging::ensure_dir(&output_dir)?;

    let prefix = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(FAULT_PREFIX);

    let structures =
        stacking::generalized_stacking_fault(&cell, &info, &disps, !args.pathway.isf_only)?;
    for s in &structures {
        let path = output_dir.join(fault_file_name(prefix, s.displacement));
        poscar::write_poscar_file(&s.cell, &path)?;
    }

    output::print_done(&format!(
        "Wrote {} structures to '{}'",
        structures.len(),
        output_dir.display()
    ));
    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    output::print_header("Staging Stacking-Fault Calculations");

    let sched = &args.scheduler;
    let totals = pathway_totals(&args.pathway)?;

    let poscars: Vec<String> = totals
        .iter()
        .map(|d| fault_file_name(FAULT_PREFIX, *d))
        .collect();
    let mut required: Vec<&str> = RUN_INPUTS.to_vec();
    required.extend(poscars.iter().map(String::as_str));
    staging::require_inputs(&sched.inputs, &required)?;

    let pb = progress::create_staging_bar(totals.len() as u64);
    let mut dirs = Vec::with_capacity(totals.len());
    for (d, poscar_name) in totals.iter().zip(&poscars) {
        let name = format!("{}_{:.5}", args.job_name, d);
        pb.set_message(name.clone());

        let dir = sched.work_dir.join(&name);
        staging::ensure_dir(&dir)?;
        let dest = dir.join("POSCAR");
        fs::copy(sched.inputs.join(poscar_name), &dest).map_err(|e| {
            CellforgeError::FileWriteError {
                path: dest.display().to_string(),
                source: e,
            }
        })?;
        staging::copy_inputs(&sched.inputs, &RUN_INPUTS, &dir)?;

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
        stages: vec![Stage::Single],
    };
    plan.finish(&sched.inputs, sched.submit)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::scheduler::SchedulerArgs;
    use crate::models::Mobility;
    use std::path::PathBuf;

    fn pathway(shifts: usize, isf_only: bool) -> PathwayArgs {
        PathwayArgs { shifts, isf_only }
    }

    fn scheduler(inputs: &Path, work: &Path, results: &Path) -> SchedulerArgs {
        SchedulerArgs {
            inputs: inputs.to_path_buf(),
            work_dir: work.to_path_buf(),
            results_dir: results.to_path_buf(),
            run_length: 300,
            cores: 16,
            nodes: None,
            queue: "normal".to_string(),
            email: None,
            allocation: None,
            modules: "vasp".to_string(),
            vasp_exec: "vasp_std".to_string(),
            submit: false,
        }
    }

    #[test]
    fn test_pathway_totals() {
        assert_eq!(pathway_totals(&pathway(2, true)).unwrap(), vec![0.0, 0.5, 1.0]);
        assert_eq!(
            pathway_totals(&pathway(2, false)).unwrap(),
            vec![0.0, 0.5, 1.0, 1.5, 2.0]
        );
        assert!(pathway_totals(&pathway(0, false)).is_err());
    }

    #[test]
    fn test_create_then_fault() {
        let dir = tempfile::tempdir().unwrap();
        let slab = dir.path().join("POSCAR");

        create(CreateArgs {
            element: "Cu".to_string(),
            lattice_constant: 3.6355,
            nx: 1,
            ny: 1,
            sequence: stacking::TWIN_SEQUENCE.to_string(),
            output: slab.clone(),
        })
        .unwrap();

        let cell = poscar::read_poscar_file(&slab).unwrap();
        assert_eq!(cell.total_atoms(), 28);
        assert!(cell
            .iter_sites()
            .all(|s| s.mobility == Mobility::new(false, false, true)));

        fault(FaultArgs {
            input: slab,
            output_dir: None,
            pathway: pathway(2, false),
        })
        .unwrap();

        for name in [
            "POSCAR_000000",
            "POSCAR_050000",
            "POSCAR_100000",
            "POSCAR_150000",
            "POSCAR_200000",
        ] {
            assert!(dir.path().join(name).is_file(), "{name}");
        }

        let shifted = poscar::read_poscar_file(&dir.path().join("POSCAR_100000")).unwrap();
        let y = shifted.site(0, 0).unwrap().position[1];
        assert!((y - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_stages_fault_directories() {
        let root = tempfile::tempdir().unwrap();
        let inputs = root.path().join("inputs");
        let work = root.path().join("work");
        let results = root.path().join("results");
        fs::create_dir_all(&inputs).unwrap();
        for f in RUN_INPUTS {
            fs::write(inputs.join(f), f).unwrap();
        }
        for d in [0.0, 1.0] {
            fs::write(inputs.join(fault_file_name("POSCAR", d)), format!("{d}")).unwrap();
        }

        run(RunArgs {
            pathway: pathway(1, true),
            job_name: "GSF".to_string(),
            scheduler: scheduler(&inputs, &work, &results),
        })
        .unwrap();

        let staged: PathBuf = work.join("GSF_1.00000");
        assert_eq!(fs::read_to_string(staged.join("POSCAR")).unwrap(), "1");
        assert!(staged.join("POTCAR").is_file());

        let script = fs::read_to_string(inputs.join("GSF_submit")).unwrap();
        assert!(script.contains("#SBATCH -n 32"));
        assert!(script.contains("mkdir GSF_results"));
    }

    #[test]
    fn test_run_reports_missing_fault_structure() {
        let root = tempfile::tempdir().unwrap();
        for f in RUN_INPUTS {
            fs::write(root.path().join(f), f).unwrap();
        }
        let err = run(RunArgs {
            pathway: pathway(1, true),
            job_name: "GSF".to_string(),
            scheduler: scheduler(root.path(), root.path(), root.path()),
        })
        .unwrap_err();
        assert!(matches!(err, CellforgeError::FileNotFound { .. }));
    }
}

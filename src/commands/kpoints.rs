//! # kpoints 命令实现
//!
//! k 点收敛测试：每个自动网格长度一个计算目录，单阶段提交脚本。
//!
//! ## 依赖关系
//! - 使用 `cli/kpoints.rs` 定义的参数
//! - 使用 `parsers/kpoints.rs`
//! - 使用 `utils/staging.rs`, `utils/slurm.rs`

use crate::cli::kpoints::KpointsArgs;
use crate::error::{CellforgeError, Result};
use crate::parsers::kpoints::write_auto_kpoints_file;
use crate::utils::slurm::Stage;
use crate::utils::staging::{self, JobPlan};
use crate::utils::{output, progress};

const INPUTS: [&str; 3] = ["POSCAR", "INCAR", "POTCAR"];

/// 执行 kpoints 命令
pub fn execute(args: KpointsArgs) -> Result<()> {
    output::print_header("K-point Convergence");

    if args.min == 0 || args.max < args.min {
        return Err(CellforgeError::InvalidRange(format!(
            "mesh lengths {} .. {}",
            args.min, args.max
        )));
    }

    let sched = &args.scheduler;
    staging::require_inputs(&sched.inputs, &INPUTS)?;

    let lengths: Vec<u32> = (args.min..=args.max).collect();
    let pb = progress::create_staging_bar(lengths.len() as u64);
    let mut dirs = Vec::with_capacity(lengths.len());
    for k in &lengths {
        let name = format!("{}_{}", args.job_name, k);
        pb.set_message(name.clone());

        let dir = sched.work_dir.join(&name);
        staging::ensure_dir(&dir)?;
        staging::copy_inputs(&sched.inputs, &INPUTS, &dir)?;
        write_auto_kpoints_file(*k, &dir.join("KPOINTS"))?;

        dirs.push(name);
        pb.inc(1);
    }
    pb.finish_and_clear();
    output::print_info(&format!(
        "Staged mesh lengths {}..={} in '{}'",
        args.min,
        args.max,
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

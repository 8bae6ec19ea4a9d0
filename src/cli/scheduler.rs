//! # 作业调度公共参数
//!
//! `lattice`、`kpoints`、`gsf run` 共用的 Slurm 与目录参数，
//! 目录、邮箱和项目号可从环境变量读取。
//!
//! ## 依赖关系
//! - 被 `cli/lattice.rs`, `cli/kpoints.rs`, `cli/gsf.rs` 使用
//! - 转换为 `utils/slurm.rs` 的 `SlurmConfig`

use crate::utils::slurm::SlurmConfig;
use clap::Args;
use std::path::PathBuf;

/// Slurm 与目录参数
#[derive(Args, Debug, Clone)]
pub struct SchedulerArgs {
    /// Directory holding the input files (INCAR*, KPOINTS, POTCAR, POSCAR)
    #[arg(long, default_value = ".")]
    pub inputs: PathBuf,

    /// Scratch directory where calculation directories are staged and run
    #[arg(long, env = "CELLFORGE_WORK_DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Directory receiving the <job>_*_results archives
    #[arg(long, env = "CELLFORGE_RESULTS_DIR", default_value = ".")]
    pub results_dir: PathBuf,

    /// Maximum run time in minutes
    #[arg(short = 't', long, default_value_t = 300)]
    pub run_length: u32,

    /// Number of cores per calculation
    #[arg(short = 'n', long, default_value_t = 16)]
    pub cores: u32,

    /// Number of nodes per calculation (default: cores / 16, 0 omits -N)
    #[arg(short = 'N', long)]
    pub nodes: Option<u32>,

    /// Slurm queue (partition)
    #[arg(short = 'p', long, default_value = "normal")]
    pub queue: String,

    /// E-mail address for Slurm notifications
    #[arg(long, env = "CELLFORGE_EMAIL")]
    pub email: Option<String>,

    /// Project allocation charged by the job
    #[arg(short = 'A', long, env = "CELLFORGE_ALLOCATION")]
    pub allocation: Option<String>,

    /// Modules to load (comma-separated)
    #[arg(long, default_value = "vasp")]
    pub modules: String,

    /// VASP executable name
    #[arg(long, default_value = "vasp_std")]
    pub vasp_exec: String,

    /// Submit the generated script with sbatch
    #[arg(long, default_value_t = false)]
    pub submit: bool,
}

impl SchedulerArgs {
    pub fn to_config(&self, job_name: &str) -> SlurmConfig {
        SlurmConfig {
            job_name: job_name.to_string(),
            queue: self.queue.clone(),
            cores: self.cores,
            nodes: self.nodes.unwrap_or(self.cores / 16),
            run_length: self.run_length,
            email: self.email.clone().filter(|s| !s.is_empty()),
            allocation: self.allocation.clone().filter(|s| !s.is_empty()),
            modules: self
                .modules
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            executable: self.vasp_exec.clone(),
        }
    }
}

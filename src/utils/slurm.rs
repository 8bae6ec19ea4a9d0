//! # Slurm 脚本生成工具
//!
//! 生成一次申请、多目录并行运行 VASP 的 sbatch 提交脚本。
//! 每个阶段在所有目录中用 `ibrun -o <偏移>` 同时启动，`wait` 后归档。
//!
//! ## 依赖关系
//! - 被 `commands/lattice.rs`, `commands/kpoints.rs`, `commands/gsf.rs` 使用
//! - 使用 `error.rs`

use crate::error::{CellforgeError, Result};
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

/// Slurm 作业配置
#[derive(Debug, Clone)]
pub struct SlurmConfig {
    pub job_name: String,
    pub queue: String,
    /// 每个目录的核数
    pub cores: u32,
    /// 每个目录的节点数，0 表示不写 `-N`
    pub nodes: u32,
    /// 墙钟时间（分钟）
    pub run_length: u32,
    pub email: Option<String>,
    pub allocation: Option<String>,
    pub modules: Vec<String>,
    pub executable: String,
}

impl Default for SlurmConfig {
    fn default() -> Self {
        SlurmConfig {
            job_name: "job".to_string(),
            queue: "normal".to_string(),
            cores: 16,
            nodes: 1,
            run_length: 60,
            email: None,
            allocation: None,
            modules: vec!["vasp".to_string()],
            executable: "vasp_std".to_string(),
        }
    }
}

/// 计算阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 初次弛豫，结果复制归档
    Relax,
    /// 从 CONTCAR 继续弛豫，结果复制归档
    ReRelax,
    /// 最终静态计算，目录移动归档
    Static,
    /// 单阶段计算，使用目录中已有的 INCAR
    Single,
}

impl Stage {
    /// 运行前复制为 INCAR 的文件
    pub fn incar(self) -> Option<&'static str> {
        match self {
            Stage::Relax => Some("INCAR_relax"),
            Stage::ReRelax => Some("INCAR_cont"),
            Stage::Static => Some("INCAR_static"),
            Stage::Single => None,
        }
    }

    /// 结果目录名 `<job>_<stage>_results`
    pub fn results_name(self, job_name: &str) -> String {
        match self {
            Stage::Relax => format!("{}_relax_results", job_name),
            Stage::ReRelax => format!("{}_re-relax_results", job_name),
            Stage::Static => format!("{}_static_results", job_name),
            Stage::Single => format!("{}_results", job_name),
        }
    }

    /// 最终阶段移动目录，中间阶段复制
    fn moves_results(self) -> bool {
        matches!(self, Stage::Static | Stage::Single)
    }
}

/// 分钟数 -> `HH:MM:00`
pub fn format_walltime(minutes: u32) -> String {
    format!("{:02}:{:02}:00", minutes / 60, minutes % 60)
}

/// 生成 sbatch 头部
pub fn generate_header(config: &SlurmConfig, n_dirs: usize) -> String {
    let n_dirs = n_dirs as u32;
    let mut s = String::from("#!/bin/bash\n");
    let _ = writeln!(s, "#SBATCH -J {}", config.job_name);
    let _ = writeln!(s, "#SBATCH -o {}_%j", config.job_name);
    let _ = writeln!(s, "#SBATCH -n {}", config.cores * n_dirs);
    if config.nodes > 0 {
        let _ = writeln!(s, "#SBATCH -N {}", config.nodes * n_dirs);
    }
    let _ = writeln!(s, "#SBATCH -p {}", config.queue);
    let _ = writeln!(s, "#SBATCH -t {}", format_walltime(config.run_length));
    if let Some(email) = &config.email {
        let _ = writeln!(s, "#SBATCH --mail-user={}", email);
        let _ = writeln!(s, "#SBATCH --mail-type=all");
    }
    if let Some(allocation) = &config.allocation {
        let _ = writeln!(s, "#SBATCH -A {}", allocation);
    }
    for module in &config.modules {
        let _ = writeln!(s, "module load {}", module);
    }
    s
}

/// 生成单个阶段：并行启动、等待、归档
///
/// `from_contcar` 为真时在运行前用上一阶段的 CONTCAR 覆盖 POSCAR。
pub fn generate_stage(
    config: &SlurmConfig,
    stage: Stage,
    work_dir: &Path,
    results_dir: &Path,
    dirs: &[String],
    from_contcar: bool,
) -> String {
    let mut s = String::new();

    for (i, dir) in dirs.iter().enumerate() {
        let _ = writeln!(s, "cd {}", work_dir.join(dir).display());
        if let Some(incar) = stage.incar() {
            let _ = writeln!(s, "cp {} INCAR", incar);
        }
        if from_contcar {
            let _ = writeln!(s, "cp CONTCAR POSCAR");
        }
        let _ = writeln!(
            s,
            "ibrun -o {} -n {} {} > vasp_output.out &",
            config.cores as usize * i,
            config.cores,
            config.executable
        );
    }
    s.push_str("wait\n");

    let archive = results_dir.join(stage.results_name(&config.job_name));
    let _ = writeln!(s, "cd {}", results_dir.display());
    let _ = writeln!(s, "mkdir {}", stage.results_name(&config.job_name));
    for dir in dirs {
        let _ = writeln!(s, "cd {}", work_dir.display());
        if stage.moves_results() {
            let _ = writeln!(s, "mv {} {}", dir, archive.display());
        } else {
            let _ = writeln!(s, "cp -r {} {}", dir, archive.display());
        }
    }
    s
}

/// 生成完整提交脚本
///
/// 重新弛豫总是从 CONTCAR 开始；静态计算在有弛豫阶段时也从 CONTCAR 开始。
pub fn generate_submit_script(
    config: &SlurmConfig,
    work_dir: &Path,
    results_dir: &Path,
    dirs: &[String],
    stages: &[Stage],
) -> String {
    let relaxed = stages.contains(&Stage::Relax);
    let mut script = generate_header(config, dirs.len());

    for &stage in stages {
        let from_contcar = match stage {
            Stage::ReRelax => true,
            Stage::Static => relaxed,
            Stage::Relax | Stage::Single => false,
        };
        script.push_str(&generate_stage(
            config,
            stage,
            work_dir,
            results_dir,
            dirs,
            from_contcar,
        ));
    }
    script
}

/// 调用 sbatch 提交脚本，返回 sbatch 的输出
pub fn submit_script(script: &Path) -> Result<String> {
    let cwd = script
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let out = Command::new("sbatch")
        .arg(script)
        .current_dir(cwd)
        .output()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CellforgeError::CommandNotFound {
                    command: "sbatch".to_string(),
                }
            } else {
                CellforgeError::CommandFailed {
                    command: format!("sbatch {}", script.display()),
                    stderr: e.to_string(),
                }
            }
        })?;

    if !out.status.success() {
        return Err(CellforgeError::CommandFailed {
            command: format!("sbatch {}", script.display()),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

//! # 作业目录准备
//!
//! 创建计算目录、复制输入文件、写出可执行的提交脚本并按需调用 sbatch。
//!
//! ## 依赖关系
//! - 被 `commands/lattice.rs`, `commands/kpoints.rs`, `commands/gsf.rs` 使用
//! - 使用 `utils/slurm.rs`, `utils/output.rs`

use crate::error::{CellforgeError, Result};
use crate::utils::output;
use crate::utils::slurm::{self, SlurmConfig, Stage};
use std::fs;
use std::path::{Path, PathBuf};

/// 创建目录（含父目录）
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| CellforgeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 从 `src_dir` 复制指定文件到 `dest_dir`
pub fn copy_inputs(src_dir: &Path, names: &[&str], dest_dir: &Path) -> Result<()> {
    for name in names {
        let src = src_dir.join(name);
        if !src.is_file() {
            return Err(CellforgeError::FileNotFound {
                path: src.display().to_string(),
            });
        }
        let dest = dest_dir.join(name);
        fs::copy(&src, &dest).map_err(|e| CellforgeError::FileWriteError {
            path: dest.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// 检查输入目录中的必需文件，提前报告缺失
pub fn require_inputs(src_dir: &Path, names: &[&str]) -> Result<()> {
    if !src_dir.is_dir() {
        return Err(CellforgeError::DirectoryNotFound {
            path: src_dir.display().to_string(),
        });
    }
    match names.iter().find(|n| !src_dir.join(n).is_file()) {
        Some(missing) => Err(CellforgeError::FileNotFound {
            path: src_dir.join(missing).display().to_string(),
        }),
        None => Ok(()),
    }
}

/// 写出脚本并设置用户可执行权限
pub fn write_script(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| CellforgeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(path)
            .map_err(|e| CellforgeError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?
            .permissions();
        perms.set_mode(perms.mode() | 0o100);
        fs::set_permissions(path, perms).map_err(|e| CellforgeError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
    }

    Ok(())
}

/// 一组已准备好的计算目录
pub struct JobPlan {
    pub config: SlurmConfig,
    pub work_dir: PathBuf,
    pub results_dir: PathBuf,
    pub dirs: Vec<String>,
    pub stages: Vec<Stage>,
}

impl JobPlan {
    /// 提交脚本路径 `<script_dir>/<job>_submit`
    pub fn script_path(&self, script_dir: &Path) -> PathBuf {
        script_dir.join(format!("{}_submit", self.config.job_name))
    }

    pub fn render(&self) -> String {
        slurm::generate_submit_script(
            &self.config,
            &self.work_dir,
            &self.results_dir,
            &self.dirs,
            &self.stages,
        )
    }

    /// 写出提交脚本，`submit` 时调用 sbatch
    pub fn finish(&self, script_dir: &Path, submit: bool) -> Result<PathBuf> {
        let script = self.script_path(script_dir);
        write_script(&script, &self.render())?;
        output::print_success(&format!(
            "Wrote {} ({} directories, stages: {})",
            script.display(),
            self.dirs.len(),
            self.stages
                .iter()
                .map(|s| format!("{:?}", s).to_lowercase())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        if submit {
            let reply = slurm::submit_script(&script)?;
            output::print_success(&format!("Submitted: {}", reply));
        } else {
            output::print_info(&format!(
                "Not submitted; run 'sbatch {}' when ready",
                script.display()
            ));
        }
        Ok(script)
    }
}

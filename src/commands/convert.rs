//! # convert 命令实现
//!
//! 将 ATAT mcsqs 输出的 bestsqs.out 转换为 POSCAR。
//!
//! ## 功能
//! - 单文件：写入 `--output`（默认 POSCAR）
//! - 目录：按 glob 模式收集，并行写出 `POSCAR_<stem>`
//! - 已存在的输出默认跳过
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `parsers/sqs.rs`, `parsers/poscar.rs`
//! - 使用 `batch/` 收集与并行处理

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::convert::ConvertArgs;
use crate::error::{CellforgeError, Result};
use crate::parsers::{poscar, sqs};
use crate::utils::output;
use crate::utils::staging::ensure_dir;

use std::path::{Path, PathBuf};

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header("Converting SQS to POSCAR");

    if !args.input.exists() {
        return Err(CellforgeError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let collector = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive);

    if collector.is_single_file() {
        let output_path = args.output.unwrap_or_else(|| PathBuf::from("POSCAR"));
        return match convert_file(&args.input, &output_path, args.overwrite)? {
            ProcessResult::Skipped(path) => {
                output::print_skip(&format!("{} exists (use --overwrite)", path));
                Ok(())
            }
            _ => {
                output::print_conversion(&args.input, &output_path);
                Ok(())
            }
        };
    }

    let files = collector.collect();
    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    let output_dir = args.output.unwrap_or_else(|| args.input.clone());
    ensure_dir(&output_dir)?;
    output::print_info(&format!("Found {} SQS files to convert", files.len()));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |input| {
        let output_path = output_dir.join(output_name(input));
        match convert_file(input, &output_path, args.overwrite) {
            Ok(status) => status,
            Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
        }
    })?;

    for (path, err) in &result.failures {
        output::print_error(&format!("{}: {}", path, err));
    }

    output::print_separator();
    output::print_done(&format!(
        "Converted {} of {} file(s) into '{}' ({} skipped, {} failed)",
        result.success,
        result.total(),
        output_dir.display(),
        result.skipped,
        result.failed
    ));

    Ok(())
}

/// `bestsqs12.out` -> `POSCAR_bestsqs12`
fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sqs");
    format!("POSCAR_{}", stem)
}

/// 转换单个文件
fn convert_file(input: &Path, output_path: &Path, overwrite: bool) -> Result<ProcessResult> {
    if output_path.exists() && !overwrite {
        return Ok(ProcessResult::Skipped(output_path.display().to_string()));
    }

    let cell = sqs::read_sqs_file(input)?;
    poscar::write_poscar_file(&cell, output_path)?;
    Ok(ProcessResult::Success(output_path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SQS: &str = "\
1 0 0
0 1 0
0 0 1
2 0 0
0 2 0
0 0 2
0 0 0 Al
0.5 0.5 0.5 Ni
";

    #[test]
    fn test_output_name() {
        assert_eq!(output_name(Path::new("/a/bestsqs12.out")), "POSCAR_bestsqs12");
    }

    #[test]
    fn test_convert_file_and_skip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bestsqs.out");
        let out = dir.path().join("POSCAR");
        fs::write(&input, SQS).unwrap();

        let status = convert_file(&input, &out, false).unwrap();
        assert!(matches!(status, ProcessResult::Success(_)));
        let cell = poscar::read_poscar_file(&out).unwrap();
        assert_eq!(cell.elements(), &["Al".to_string(), "Ni".to_string()]);

        let again = convert_file(&input, &out, false).unwrap();
        assert!(matches!(again, ProcessResult::Skipped(_)));
        let forced = convert_file(&input, &out, true).unwrap();
        assert!(matches!(forced, ProcessResult::Success(_)));
    }

    #[test]
    fn test_execute_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bestsqs1.out"), SQS).unwrap();
        fs::write(dir.path().join("bestsqs2.out"), SQS).unwrap();
        fs::write(dir.path().join("bestsqs3.out"), "broken").unwrap();

        execute(ConvertArgs {
            input: dir.path().to_path_buf(),
            output: Some(dir.path().join("out")),
            recursive: false,
            pattern: "bestsqs*.out".to_string(),
            jobs: 2,
            overwrite: false,
        })
        .unwrap();

        assert!(dir.path().join("out/POSCAR_bestsqs1").is_file());
        assert!(dir.path().join("out/POSCAR_bestsqs2").is_file());
        assert!(!dir.path().join("out/POSCAR_bestsqs3").exists());
    }
}

//! # 文件收集器
//!
//! 根据输入路径和 glob 模式收集待处理文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 逗号分隔的多个 glob 模式
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{CellforgeError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<Pattern>,
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    CellforgeError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn is_single_file(&self) -> bool {
        self.input.is_file()
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches_patterns(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }

    /// 未设置模式时匹配所有文件
    fn matches_patterns(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_with_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bestsqs.out"), "").unwrap();
        fs::write(dir.path().join("bestsqs2.out"), "").unwrap();
        fs::write(dir.path().join("rndstr.in"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/bestsqs3.out"), "").unwrap();

        let flat = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("bestsqs*.out")
            .unwrap()
            .collect();
        assert_eq!(flat.len(), 2);
        assert!(flat[0].ends_with("bestsqs.out"));

        let deep = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("bestsqs*.out")
            .unwrap()
            .recursive(true)
            .collect();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_multiple_patterns_and_single_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.out"), "").unwrap();
        fs::write(dir.path().join("b.in"), "").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.out, *.in")
            .unwrap()
            .collect();
        assert_eq!(files.len(), 2);

        let single = FileCollector::new(dir.path().join("a.out"));
        assert!(single.is_single_file());
        assert_eq!(single.collect().len(), 1);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileCollector::new(PathBuf::from("."))
            .with_pattern("[abc")
            .is_err());
    }
}

//! 本地目标匹配
//!
//! 编排器与压缩构建共用的 glob 解析，命中顺序与底层遍历一致，不做排序

use std::path::PathBuf;

use crate::error::{Result, SyncError};

/// 按 glob 模式匹配本地路径，返回所有命中项（可能包含目录）
pub fn match_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| SyncError::Config(format!("无效的 glob 模式 {}: {}", pattern, e)))?;

    let mut targets = Vec::new();
    for entry in paths {
        // 遍历中途的读取失败视为本地 IO 错误
        targets.push(entry.map_err(|e| SyncError::Io(e.into_error()))?);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out.bin"), b"data").unwrap();

        let matches = match_pattern(&format!("{}/out.bin", dir.path().display())).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].ends_with("out.bin"));
    }

    #[test]
    fn test_multiple_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("c.log"), b"c").unwrap();

        let matches = match_pattern(&format!("{}/*.txt", dir.path().display())).unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let dir = tempfile::tempdir().unwrap();

        let matches = match_pattern(&format!("{}/missing-*", dir.path().display())).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_directory_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let matches = match_pattern(&format!("{}/sub", dir.path().display())).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].is_dir());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(match_pattern("[invalid").is_err());
    }
}

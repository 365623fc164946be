//! 压缩包构建
//!
//! 将 glob 命中的条目写入 zip（deflate 压缩），命中目录时递归收录其下文件。
//! 条目顺序与遍历顺序一致，不保证排序；失败时残留的半成品文件由调用方视为不可用

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, SyncError};
use crate::targets;

/// 按 glob 模式构建压缩包，返回写入的总字节数
///
/// 零命中也会产出一个合法的空压缩包（与来源行为一致）
pub async fn build_archive(pattern: &str, output_path: &Path) -> Result<u64> {
    let pattern = pattern.to_string();
    let output_path = output_path.to_path_buf();

    // 压缩是同步 IO，放到阻塞线程执行
    tokio::task::spawn_blocking(move || build_archive_blocking(&pattern, &output_path))
        .await
        .map_err(|e| SyncError::Io(io::Error::new(io::ErrorKind::Other, e)))?
}

fn build_archive_blocking(pattern: &str, output_path: &Path) -> Result<u64> {
    let matches = targets::match_pattern(pattern)?;
    debug!("glob {} 命中 {} 项", pattern, matches.len());

    let file = File::create(output_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // 防止模式同时命中目录与其下文件时产生重复条目
    let mut seen = HashSet::new();

    for path in &matches {
        if path.is_dir() {
            add_dir_entries(&mut zip, path, options, &mut seen)?;
        } else {
            add_file_entry(&mut zip, path, options, &mut seen)?;
        }
    }

    let file = zip
        .finish()
        .map_err(|e| SyncError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
    let bytes = file.metadata()?.len();

    info!("文件压缩完成: 共写入 {} 字节", bytes);
    Ok(bytes)
}

/// 递归收录目录下的所有普通文件
fn add_dir_entries(
    zip: &mut ZipWriter<File>,
    dir: &Path,
    options: SimpleFileOptions,
    seen: &mut HashSet<String>,
) -> Result<()> {
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| SyncError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        if entry.file_type().is_file() {
            add_file_entry(zip, entry.path(), options, seen)?;
        }
    }
    Ok(())
}

fn add_file_entry(
    zip: &mut ZipWriter<File>,
    path: &Path,
    options: SimpleFileOptions,
    seen: &mut HashSet<String>,
) -> Result<()> {
    let name = entry_name(path);
    if !seen.insert(name.clone()) {
        return Ok(());
    }

    zip.start_file(name, options)
        .map_err(|e| SyncError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
    let mut reader = File::open(path)?;
    io::copy(&mut reader, zip)?;
    Ok(())
}

/// 条目名称：统一分隔符并去掉根前缀
fn entry_name(path: &Path) -> String {
    let name = path.to_string_lossy().replace('\\', "/");
    name.trim_start_matches("./").trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_names(path: &Path) -> HashSet<String> {
        let file = File::open(path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_archive_multiple_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"aaa").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"bbb").unwrap();
        let out = dir.path().join("release.zip");

        let pattern = format!("{}/*.txt", dir.path().display());
        let bytes = build_archive_blocking(&pattern, &out).unwrap();

        assert!(bytes > 0);
        assert_eq!(bytes, std::fs::metadata(&out).unwrap().len());

        // 只做集合相等断言，不约定条目顺序
        let names = archive_names(&out);
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|n| n.ends_with("a.txt")));
        assert!(names.iter().any(|n| n.ends_with("b.txt")));
    }

    #[test]
    fn test_archive_zero_matches_is_empty_zip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.zip");

        let pattern = format!("{}/missing-*", dir.path().display());
        build_archive_blocking(&pattern, &out).unwrap();

        assert!(archive_names(&out).is_empty());
    }

    #[test]
    fn test_archive_directory_match_recurses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
        std::fs::write(dir.path().join("sub/f.txt"), b"f").unwrap();
        std::fs::write(dir.path().join("sub/inner/g.txt"), b"g").unwrap();
        let out = dir.path().join("dir.zip");

        let pattern = format!("{}/sub", dir.path().display());
        build_archive_blocking(&pattern, &out).unwrap();

        let names = archive_names(&out);
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|n| n.ends_with("sub/f.txt")));
        assert!(names.iter().any(|n| n.ends_with("sub/inner/g.txt")));
    }

    #[test]
    fn test_archive_no_duplicate_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/f.txt"), b"f").unwrap();
        // 输出放在被匹配目录之外，避免压缩包收录自身
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("dup.zip");

        // ** 同时命中目录与其下文件
        let pattern = format!("{}/**", dir.path().display());
        build_archive_blocking(&pattern, &out).unwrap();

        let names = archive_names(&out);
        assert_eq!(names.len(), 1);
    }
}

//! 输出上报模块
//!
//! 将运行结果写入 Runner 的 GITHUB_OUTPUT 文件，把失败映射为
//! 进程级失败信号（::error:: 工作流命令 + 非零退出码）

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::core::RunReport;

/// 输出名称
pub const OUTPUT_LINK: &str = "link";
pub const OUTPUT_REF_ID: &str = "refId";
pub const OUTPUT_FOLDER_FILES: &str = "folderFiles";

/// 将报告中出现的输出逐个写出；失败分支不会产生任何成功输出
pub fn report(report: &RunReport) {
    if let Some(link) = &report.link {
        set_output(OUTPUT_LINK, link);
    }
    if let Some(ref_id) = &report.ref_id {
        set_output(OUTPUT_REF_ID, ref_id);
    }
    if let Some(folder_files) = &report.folder_files {
        set_output(OUTPUT_FOLDER_FILES, folder_files);
    }
}

/// 写入一个输出（追加到 GITHUB_OUTPUT 指向的文件）
pub fn set_output(name: &str, value: &str) {
    let Ok(path) = std::env::var("GITHUB_OUTPUT") else {
        debug!("GITHUB_OUTPUT 未设置，跳过输出 {}", name);
        return;
    };
    if let Err(e) = write_output(Path::new(&path), name, value) {
        warn!("写入输出 {} 失败: {}", name, e);
    }
}

/// 追加一条 name=value 记录；多行取值使用 heredoc 语法
fn write_output(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if value.contains('\n') {
        writeln!(file, "{}<<EOF\n{}\nEOF", name, value)?;
    } else {
        writeln!(file, "{}={}", name, value)?;
    }
    Ok(())
}

/// 失败信号：输出 ::error:: 工作流命令，由入口以非零码退出
pub fn set_failed(message: &str) {
    // 单行化，避免截断工作流命令
    println!("::error::{}", message.replace('\n', " "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        write_output(&path, "link", "https://example.com/a").unwrap();
        write_output(&path, "refId", "abc123").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "link=https://example.com/a\nrefId=abc123\n");
    }

    #[test]
    fn test_write_output_multiline_uses_heredoc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        write_output(&path, "folderFiles", "line1\nline2").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "folderFiles<<EOF\nline1\nline2\nEOF\n");
    }
}

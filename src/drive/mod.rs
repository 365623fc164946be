//! Google Drive 远程存储
//!
//! 以 id 寻址的四个操作（上传/下载/列取/删除），全部直通 Drive v3 API

pub mod auth;
pub mod client;

pub use client::DriveClient;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// 远程文件引用（id + 名称），上传成功后创建，列取/删除按引用操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
}

/// 远程存储抽象接口
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// 上传本地文件到指定父文件夹，返回新对象引用
    async fn upload(
        &self,
        name: &str,
        local_path: &Path,
        parent_folder_id: &str,
    ) -> Result<RemoteFile>;

    /// 下载对象内容到本地路径；中途失败不留下半写入的文件
    async fn download(&self, file_id: &str, local_path: &Path) -> Result<()>;

    /// 列出文件夹的直接子项（仅 id 与名称），无子项返回空列表
    async fn list(&self, parent_folder_id: &str) -> Result<Vec<RemoteFile>>;

    /// 按 id 删除一个远程对象
    async fn delete(&self, file_id: &str) -> Result<()>;
}

/// 文件夹快照 — 某一时刻的直接子项列表，仅用于诊断日志，不参与正确性判断
#[derive(Debug, Clone, Default)]
pub struct FolderSnapshot {
    pub files: Vec<RemoteFile>,
}

impl FolderSnapshot {
    pub fn new(files: Vec<RemoteFile>) -> Self {
        Self { files }
    }

    /// JSON 形式，用于日志输出
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.files).unwrap_or_default()
    }

    /// 与之后的快照对比，输出新增/移除的诊断日志
    pub fn log_diff(&self, after: &FolderSnapshot) {
        for file in &after.files {
            if !self.files.iter().any(|f| f.id == file.id) {
                info!("新增文件: {} ({})", file.name, file.id);
            }
        }
        for file in &self.files {
            if !after.files.iter().any(|f| f.id == file.id) {
                info!("移除文件: {} ({})", file.name, file.id);
            }
        }
    }
}

//! 同步编排器
//!
//! 按操作类型分派到上传/下载/列取/删除分支。上传分支负责单文件与
//! 打包上传的选择、上传前后的文件夹快照，以及可选的旧文件清理

use std::path::PathBuf;

use tracing::{info, warn};

use crate::archive;
use crate::drive::{FolderSnapshot, RemoteFile, RemoteStore};
use crate::error::{Result, SyncError};
use crate::params::{Action, Params};
use crate::targets;

/// 运行状态: Idle -> 分支状态 -> Done / Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Uploading,
    Downloading,
    Listing,
    Deleting,
    Done,
    Failed,
}

/// Drive 文件夹链接前缀
const FOLDER_LINK_BASE: &str = "https://drive.google.com/drive/folders/";

/// 文件分享链接
fn file_link(id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view?usp=sharing", id)
}

/// 运行报告 — 各分支产生的输出集中于此，由上报模块写出
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// 分享链接（仅上传分支）
    pub link: Option<String>,
    /// 新建对象的 id（仅上传分支）
    pub ref_id: Option<String>,
    /// 文件夹子项的 JSON 列表（仅列取分支）
    pub folder_files: Option<String>,
}

/// 单个旧文件的清理结果，互相独立
#[derive(Debug)]
pub struct CleanupOutcome {
    pub file: RemoteFile,
    pub result: Result<()>,
}

pub struct Orchestrator<'a> {
    store: &'a dyn RemoteStore,
    params: &'a Params,
}

impl<'a> Orchestrator<'a> {
    pub fn new(store: &'a dyn RemoteStore, params: &'a Params) -> Self {
        Self { store, params }
    }

    /// 操作类型唯一决定进入哪个分支状态
    fn active_status(action: Action) -> RunStatus {
        match action {
            Action::Upload => RunStatus::Uploading,
            Action::Download => RunStatus::Downloading,
            Action::List => RunStatus::Listing,
            Action::Delete => RunStatus::Deleting,
        }
    }

    /// 执行当前参数指定的分支，成功返回运行报告
    pub async fn run(&self) -> Result<RunReport> {
        let status = Self::active_status(self.params.action);
        info!("状态切换: {:?} -> {:?}", RunStatus::Idle, status);

        let result = match self.params.action {
            Action::Upload => self.run_upload().await,
            Action::Download => self.run_download().await,
            Action::List => self.run_list().await,
            Action::Delete => self.run_delete().await,
        };

        match &result {
            Ok(_) => info!("状态切换: {:?} -> {:?}", status, RunStatus::Done),
            Err(e) => warn!("状态切换: {:?} -> {:?}: {}", status, RunStatus::Failed, e),
        }
        result
    }

    async fn run_upload(&self) -> Result<RunReport> {
        let folder_id = self.params.folder_id()?;
        info!("目标文件夹: {}{}", FOLDER_LINK_BASE, folder_id);

        // 1. 解析本地目标
        let matches = targets::match_pattern(&self.params.local_path)?;

        // 2/3. 恰好一个普通文件则直接上传，其余情况（零项、多项、目录）统一打包
        let (upload_name, upload_path) = if matches.len() == 1 && !matches[0].is_dir() {
            let path = matches[0].clone();
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    SyncError::Config(format!("无法取得文件名: {}", path.display()))
                })?;
            (name, path)
        } else {
            info!(
                "glob {} 命中 {} 项或目录，打包后上传...",
                self.params.local_path,
                matches.len()
            );
            let out_path = PathBuf::from(format!("{}.zip", self.params.zip_name()?));
            let name = out_path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    SyncError::Config(format!("无效的 zipName: {}", out_path.display()))
                })?;
            archive::build_archive(&self.params.local_path, &out_path).await?;
            (name, out_path)
        };

        // 4. 上传前快照（仅诊断）
        let before = FolderSnapshot::new(self.store.list(folder_id).await?);
        info!("上传前文件列表: {}", before.to_json());

        // 5. 创建远程对象
        let created = self
            .store
            .upload(&upload_name, &upload_path, folder_id)
            .await?;

        // 6. 可选：清理名称命中过滤子串的旧文件
        if self.params.empty_upload_folder {
            let filter = self.params.filter_for_delete()?;
            for outcome in self.cleanup_stale(&before, filter).await {
                match &outcome.result {
                    Ok(()) => info!("已清理旧文件: {} ({})", outcome.file.name, outcome.file.id),
                    Err(e) => warn!(
                        "清理旧文件失败（忽略）: {} ({}): {}",
                        outcome.file.name, outcome.file.id, e
                    ),
                }
            }
        }

        // 7. 上传后快照（仅诊断，失败不影响结果）
        match self.store.list(folder_id).await {
            Ok(files) => {
                let after = FolderSnapshot::new(files);
                info!("上传后文件列表: {}", after.to_json());
                before.log_diff(&after);
            }
            Err(e) => warn!("上传后列取失败（忽略）: {}", e),
        }

        Ok(RunReport {
            link: Some(file_link(&created.id)),
            ref_id: Some(created.id),
            folder_files: None,
        })
    }

    /// 逐个删除快照中名称包含过滤子串的对象；每个删除独立执行，
    /// 单个失败不阻断批次，结果收集后由调用方记录
    async fn cleanup_stale(&self, snapshot: &FolderSnapshot, filter: &str) -> Vec<CleanupOutcome> {
        let mut outcomes = Vec::new();
        for file in &snapshot.files {
            if !file.name.contains(filter) {
                continue;
            }
            let result = self.store.delete(&file.id).await;
            outcomes.push(CleanupOutcome {
                file: file.clone(),
                result,
            });
        }
        outcomes
    }

    async fn run_download(&self) -> Result<RunReport> {
        let file_id = self.params.file_id()?;
        let dest = PathBuf::from(&self.params.local_path);
        self.store.download(file_id, &dest).await?;
        Ok(RunReport::default())
    }

    async fn run_list(&self) -> Result<RunReport> {
        let folder_id = self.params.folder_id()?;
        let files = self.store.list(folder_id).await?;
        info!("文件夹 {} 下共 {} 个文件", folder_id, files.len());

        let json =
            serde_json::to_string(&files).map_err(|e| SyncError::List(e.to_string()))?;
        Ok(RunReport {
            link: None,
            ref_id: None,
            folder_files: Some(json),
        })
    }

    async fn run_delete(&self) -> Result<RunReport> {
        let file_id = self.params.file_id()?;
        self.store.delete(file_id).await?;
        Ok(RunReport::default())
    }
}

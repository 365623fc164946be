//! drivesync - CI 构建产物与 Google Drive 文件夹之间的同步步骤
//!
//! 由声明式步骤输入驱动四种操作：上传（多文件自动打包）、下载、列取、删除

pub mod archive;
pub mod core;
pub mod drive;
pub mod error;
pub mod logging;
pub mod outputs;
pub mod params;
pub mod targets;

pub use crate::core::{Orchestrator, RunReport, RunStatus};
pub use drive::{DriveClient, RemoteFile, RemoteStore};
pub use error::{Result, SyncError};
pub use params::{Action, Params};

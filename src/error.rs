//! 错误类型定义
//!
//! 配置与主分支错误会终止运行；清理阶段的删除失败按对象隔离，
//! 以结果列表形式收集，不进入该错误类型

use thiserror::Error;

/// 同步过程中可能出现的错误
#[derive(Debug, Error)]
pub enum SyncError {
    /// 配置错误（缺少必需输入、非法取值），在任何远程调用前失败
    #[error("配置错误: {0}")]
    Config(String),

    /// 本地文件系统或压缩包操作失败
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 凭据解析或令牌交换失败
    #[error("认证失败: {0}")]
    Auth(String),

    /// 上传调用失败
    #[error("上传失败: {0}")]
    Upload(String),

    /// 下载调用失败
    #[error("下载失败: {0}")]
    Download(String),

    /// 列取调用失败
    #[error("列取文件夹失败: {0}")]
    List(String),

    /// 删除调用失败
    #[error("删除失败: {0}")]
    Delete(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

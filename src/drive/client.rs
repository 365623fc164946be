//! Drive v3 REST 客户端
//!
//! 四个操作均为对远程 API 的一次直通调用：不重试、不设额外超时，
//! 传输层失败原样上抛给调用方

use std::path::Path;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::auth::{self, ServiceAccountKey};
use super::{RemoteFile, RemoteStore};
use crate::error::{Result, SyncError};

/// Drive v3 基础地址
const API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// 上传会话端点
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// 下载用的字节流
type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

pub struct DriveClient {
    http: reqwest::Client,
    token: String,
}

/// 创建对象时的元数据
#[derive(Serialize)]
struct CreateMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Deserialize)]
struct FileResponse {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

impl DriveClient {
    /// 用 base64 凭据创建客户端，构造时完成令牌交换
    pub async fn new(credentials: &str) -> Result<Self> {
        let http = reqwest::Client::new();
        let key = ServiceAccountKey::from_base64(credentials)?;
        let token = auth::fetch_access_token(&http, &key).await?;
        info!("Drive 客户端就绪: {}", key.client_email);
        Ok(Self { http, token })
    }
}

#[async_trait::async_trait]
impl RemoteStore for DriveClient {
    async fn upload(
        &self,
        name: &str,
        local_path: &Path,
        parent_folder_id: &str,
    ) -> Result<RemoteFile> {
        let size = fs::metadata(local_path).await?.len();
        info!("正在上传 {} ({} 字节)...", name, size);

        // 第一步：创建上传会话，提交名称与父文件夹
        let metadata = CreateMetadata {
            name,
            parents: [parent_folder_id],
        };
        let response = self
            .http
            .post(format!("{}/files?uploadType=resumable", UPLOAD_BASE))
            .bearer_auth(&self.token)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| SyncError::Upload(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SyncError::Upload(error_text(response).await));
        }
        let session = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| SyncError::Upload("会话响应缺少 Location 头".to_string()))?
            .to_string();

        // 第二步：以流式请求体提交文件内容
        let file = fs::File::open(local_path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let response = self
            .http
            .put(&session)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await
            .map_err(|e| SyncError::Upload(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SyncError::Upload(error_text(response).await));
        }

        let created: FileResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Upload(e.to_string()))?;
        info!("文件上传完成: {} ({})", created.name, created.id);
        Ok(RemoteFile {
            id: created.id,
            name: created.name,
        })
    }

    async fn download(&self, file_id: &str, local_path: &Path) -> Result<()> {
        let response = self
            .http
            .get(media_url(file_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::Download(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SyncError::Download(error_text(response).await));
        }

        let stream: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| SyncError::Download(e.to_string()))),
        );
        write_stream_to_file(stream, local_path).await?;

        info!("文件下载完成: {}", local_path.display());
        Ok(())
    }

    async fn list(&self, parent_folder_id: &str) -> Result<Vec<RemoteFile>> {
        let response = self
            .http
            .get(list_url(parent_folder_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::List(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SyncError::List(error_text(response).await));
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| SyncError::List(e.to_string()))?;
        debug!("文件夹 {} 下有 {} 个子项", parent_folder_id, body.files.len());
        // 无子项时 files 字段缺省为空列表，属正常情况
        Ok(body.files)
    }

    async fn delete(&self, file_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(file_url(file_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::Delete(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SyncError::Delete(error_text(response).await));
        }

        info!("远程对象已删除: {}", file_id);
        Ok(())
    }
}

fn file_url(file_id: &str) -> String {
    format!("{}/files/{}", API_BASE, urlencoding::encode(file_id))
}

fn media_url(file_id: &str) -> String {
    format!("{}?alt=media", file_url(file_id))
}

/// 列取某文件夹直接子项的请求地址，只取 id 与名称两个字段
fn list_url(parent_folder_id: &str) -> String {
    let query = format!("'{}' in parents", parent_folder_id);
    format!(
        "{}/files?q={}&fields=files(id,name)",
        API_BASE,
        urlencoding::encode(&query)
    )
}

/// 非成功响应统一转为「状态码: 响应体」的错误文本
async fn error_text(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("{}: {}", status, body)
}

/// 将字节流写入本地文件；中途失败时删除残留文件再上抛错误
async fn write_stream_to_file(mut stream: ByteStream, path: &Path) -> Result<()> {
    // 半写入的文件在失败退出时清理
    let guard = scopeguard::guard(path.to_path_buf(), |p| {
        let _ = std::fs::remove_file(&p);
    });

    let mut file = fs::File::create(path).await?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    // 成功落盘，解除清理
    let _ = scopeguard::ScopeGuard::into_inner(guard);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_url_escapes_query() {
        let url = list_url("folder 1");
        assert!(url.contains("q=%27folder%201%27%20in%20parents"));
        assert!(url.contains("fields=files(id,name)"));
    }

    #[test]
    fn test_media_url() {
        assert_eq!(
            media_url("abc123"),
            "https://www.googleapis.com/drive/v3/files/abc123?alt=media"
        );
    }

    #[tokio::test]
    async fn test_write_stream_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");

        let stream: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ]));
        write_stream_to_file(stream, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_write_stream_failure_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");

        let stream: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(SyncError::Download("连接中断".to_string())),
        ]));
        let err = write_stream_to_file(stream, &dest).await.unwrap_err();

        assert!(matches!(err, SyncError::Download(_)));
        assert!(!dest.exists());
    }
}

//! 参数解析模块
//!
//! 按静态输入表从环境变量解析 CI 步骤输入（`INPUT_<大写名称>` 约定），
//! 启动时构造一次不可变快照，之后以引用传入各组件

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SyncError};

// ============ 输入表 ============

/// 单个输入的声明（名称 + 是否必需），与 action.yml 保持一致
struct InputSpec {
    name: &'static str,
    required: bool,
}

/// 全部可识别的输入
///
/// googleFolderId / googleFileId / zipName / filterForDelete
/// 是否必需取决于操作类型，在解析后按分支校验
const INPUT_SCHEMA: &[InputSpec] = &[
    InputSpec { name: "credentials", required: true },
    InputSpec { name: "actionType", required: true },
    InputSpec { name: "googleFolderId", required: false },
    InputSpec { name: "googleFileId", required: false },
    InputSpec { name: "localPath", required: true },
    InputSpec { name: "zipName", required: false },
    InputSpec { name: "emptyUploadFolder", required: false },
    InputSpec { name: "filterForDelete", required: false },
];

/// 操作类型，每次运行只激活一个分支
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Download,
    List,
    Delete,
}

impl Action {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "upload" => Ok(Action::Upload),
            "download" => Ok(Action::Download),
            "list" => Ok(Action::List),
            "delete" => Ok(Action::Delete),
            _ => Err(SyncError::Config(format!("未知的 actionType: {}", s))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upload => write!(f, "upload"),
            Action::Download => write!(f, "download"),
            Action::List => write!(f, "list"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// 解析后的参数快照，全程只读
#[derive(Debug, Clone)]
pub struct Params {
    pub action: Action,
    /// base64 编码的服务账号凭据
    pub credentials: String,
    pub google_folder_id: Option<String>,
    pub google_file_id: Option<String>,
    /// 上传时为 glob 模式，下载时为目标路径
    pub local_path: String,
    pub zip_name: Option<String>,
    /// 上传成功后是否清理目标文件夹中的旧文件
    pub empty_upload_folder: bool,
    pub filter_for_delete: Option<String>,
}

impl Params {
    /// 从环境变量解析（CI Runner 以 INPUT_<大写名称> 传递步骤输入）
    pub fn from_env() -> Result<Self> {
        let mut values = HashMap::new();
        for spec in INPUT_SCHEMA {
            if let Some(value) = input_var(spec.name) {
                values.insert(spec.name.to_string(), value);
            }
        }
        Self::from_values(&values)
    }

    /// 从名称到取值的映射构造，缺失的必需输入立即报错；空串等同于缺失
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let get = |name: &str| values.get(name).filter(|v| !v.is_empty()).cloned();

        for spec in INPUT_SCHEMA {
            if spec.required && get(spec.name).is_none() {
                return Err(SyncError::Config(format!("缺少必需输入: {}", spec.name)));
            }
        }

        let action = Action::parse(&get("actionType").unwrap_or_default())?;
        let params = Params {
            action,
            credentials: get("credentials").unwrap_or_default(),
            google_folder_id: get("googleFolderId"),
            google_file_id: get("googleFileId"),
            local_path: get("localPath").unwrap_or_default(),
            zip_name: get("zipName"),
            // 与来源约定一致：只有字面 "true" 视为开启
            empty_upload_folder: get("emptyUploadFolder").as_deref() == Some("true"),
            filter_for_delete: get("filterForDelete"),
        };
        params.validate()?;
        Ok(params)
    }

    /// 分支相关的条件必需校验，保证任何远程调用前即失败
    fn validate(&self) -> Result<()> {
        match self.action {
            Action::Upload | Action::List => {
                self.folder_id()?;
            }
            Action::Download | Action::Delete => {
                self.file_id()?;
            }
        }
        if self.empty_upload_folder {
            self.filter_for_delete()?;
        }
        Ok(())
    }

    /// 上传/列取分支的目标文件夹
    pub fn folder_id(&self) -> Result<&str> {
        require(&self.google_folder_id, "googleFolderId")
    }

    /// 下载/删除分支的目标对象
    pub fn file_id(&self) -> Result<&str> {
        require(&self.google_file_id, "googleFileId")
    }

    /// 打包上传时的压缩包基础名
    pub fn zip_name(&self) -> Result<&str> {
        require(&self.zip_name, "zipName")
    }

    /// 清理旧文件时的名称过滤子串
    pub fn filter_for_delete(&self) -> Result<&str> {
        require(&self.filter_for_delete, "filterForDelete")
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| SyncError::Config(format!("缺少必需输入: {}", name)))
}

/// 读取单个输入的环境变量，空串等同于缺失
fn input_var(name: &str) -> Option<String> {
    std::env::var(format!("INPUT_{}", name.to_uppercase()))
        .ok()
        .filter(|v| !v.is_empty())
}

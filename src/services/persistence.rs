//! # 存档编解码服务
//!
//! 将 `ProjectStore` 序列化为单个 JSON 字符串（存档 blob），并从 blob 中还原。
//!
//! ## 存档格式
//! ```text
//! {
//!   projects: [ { id, name, code, lastModified, history, historyIndex } ],
//!   settings: { apiUrl, apiKey, modelId },
//!   currentProjectId: string | null
//! }
//! ```
//!
//! ## 容错策略
//! - 旧版项目记录（缺少 `history` / `historyIndex`）在 `ProjectRecord::into_project` 中迁移
//! - 顶层字段缺失时使用默认值
//! - blob 本身损坏或类型不符时，`load_or_default` 记录错误并返回空仓库，
//!   应用照常启动，不会因为存档问题拒绝运行

use serde::{Deserialize, Serialize};

use crate::models::project::ProjectRecord;
use crate::models::settings::Settings;
use crate::services::store::ProjectStore;

/// 存档 blob 的顶层结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub current_project_id: Option<String>,
}

impl From<&ProjectStore> for PersistedState {
    fn from(store: &ProjectStore) -> Self {
        Self {
            projects: store.projects().iter().map(ProjectRecord::from).collect(),
            settings: store.settings().clone(),
            current_project_id: store.current_project_id().map(str::to_string),
        }
    }
}

impl PersistedState {
    /// 迁移所有记录并构建仓库
    pub fn into_store(self) -> ProjectStore {
        let projects = self
            .projects
            .into_iter()
            .map(ProjectRecord::into_project)
            .collect();
        ProjectStore::from_parts(projects, self.settings, self.current_project_id)
    }
}

/// 将仓库序列化为存档 blob
///
/// # 错误
/// 序列化失败时返回错误信息
pub fn encode(store: &ProjectStore) -> Result<String, String> {
    serde_json::to_string(&PersistedState::from(store))
        .map_err(|e| format!("序列化存档失败: {}", e))
}

/// 解析存档 blob 并构建仓库
///
/// # 错误
/// blob 不是合法 JSON 或结构不符时返回错误信息
pub fn decode(blob: &str) -> Result<ProjectStore, String> {
    let state: PersistedState =
        serde_json::from_str(blob).map_err(|e| format!("解析存档失败: {}", e))?;
    Ok(state.into_store())
}

/// 防御式加载：任何解析错误都只记录日志，并返回空仓库和默认设置
///
/// # 参数
/// - `blob` - 存储中读出的存档内容；`None` 表示首次启动
pub fn load_or_default(blob: Option<&str>) -> ProjectStore {
    let Some(blob) = blob else {
        return ProjectStore::new();
    };

    match decode(blob) {
        Ok(store) => {
            log::info!("已加载 {} 个项目", store.projects().len());
            store
        }
        Err(e) => {
            log::error!("{}，使用默认状态启动", e);
            ProjectStore::new()
        }
    }
}

//! # 项目数据模型
//!
//! 定义了项目（Project）的运行时结构和存档结构：
//! - `Project`：运行时使用，拥有一个 `VersionedDocument`
//! - `ProjectRecord`：存档格式，文档字段扁平化在记录上（`code` / `history` / `historyIndex`）
//! - `ProjectSummary`：项目列表展示用的轻量摘要
//!
//! 存档记录对应的 JSON 结构：
//! ```typescript
//! interface Project {
//!   id: string;
//!   name: string;
//!   code: string;
//!   lastModified: number;
//!   history: string[];
//!   historyIndex: number;
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::document::VersionedDocument;

/// 新建项目时的占位文档
pub const PLACEHOLDER_DOCUMENT: &str = "<!-- Start building your website -->\n<div style=\"font-family: system-ui, sans-serif; display: flex; flex-direction: column; align-items: center; justify-content: center; height: 100vh; background: #f3f4f6; color: #1f2937;\">\n  <h1 style=\"font-size: 2.5rem; font-weight: 700; margin-bottom: 1rem;\">Hello World</h1>\n  <p style=\"color: #6b7280;\">Describe what you want to build in the prompt box below.</p>\n</div>";

/// 运行时项目
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// 唯一标识符（UUID v4）
    pub id: String,
    /// 显示名称
    pub name: String,
    /// 最后修改时间：Unix 毫秒时间戳，仅内容修改时刷新
    pub last_modified: u64,
    /// 带历史的文档
    pub document: VersionedDocument,
}

impl Project {
    /// 以占位文档创建新项目
    pub fn new(id: String, name: String, now_ms: u64) -> Self {
        Self {
            id,
            name,
            last_modified: now_ms,
            document: VersionedDocument::new(PLACEHOLDER_DOCUMENT),
        }
    }
}

/// 存档中的项目记录
///
/// 设计决策：
/// - `history` 和 `historyIndex` 在旧版存档中不存在，反序列化时均为可选
/// - `historyIndex` 使用 `serde_json::Value` 接收，非数字值按缺失处理，
///   避免一个字段类型异常导致整个存档无法加载
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    /// 当前 HTML 代码（即 `timeline[cursor]`）
    pub code: String,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub last_modified: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_index: Option<Value>,
}

impl ProjectRecord {
    /// 将存档记录迁移并还原为运行时项目
    ///
    /// 旧版记录缺少 `history` / `historyIndex` 时以 `code` 合成 `[code]` / `0`，
    /// 不会凭空捏造任何历史。对已迁移的记录重复执行结果不变。
    pub fn into_project(self) -> Project {
        let cursor = self
            .history_index
            .as_ref()
            .and_then(|v| v.as_u64())
            .map(|i| i as usize);
        Project {
            id: self.id,
            name: self.name,
            last_modified: self.last_modified,
            document: VersionedDocument::from_parts(self.code, self.history, cursor),
        }
    }
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            code: project.document.content().to_string(),
            last_modified: project.last_modified,
            history: Some(project.document.timeline().to_vec()),
            history_index: Some(Value::from(project.document.cursor())),
        }
    }
}

/// 项目列表摘要
///
/// 供侧边栏展示：名称、修改时间、是否为当前项目以及历史位置。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub last_modified: u64,
    pub active: bool,
    /// 当前游标位置（从 0 开始）
    pub history_index: usize,
    pub history_len: usize,
}

/// 接受整数或浮点形式的毫秒时间戳
///
/// 前端 `Date.now()` 写出的是整数，但手工编辑过的存档可能出现小数或负数。
fn lenient_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_is_migrated() {
        let record: ProjectRecord = serde_json::from_str(
            r#"{"id":"p1","name":"Old","code":"X","lastModified":1700000000000}"#,
        )
        .unwrap();
        let project = record.into_project();

        assert_eq!(project.document.timeline(), ["X"]);
        assert_eq!(project.document.cursor(), 0);
        assert_eq!(project.document.content(), "X");
        assert_eq!(project.last_modified, 1_700_000_000_000);
    }

    #[test]
    fn test_non_numeric_history_index_falls_back_to_zero() {
        let record: ProjectRecord = serde_json::from_str(
            r#"{"id":"p1","name":"Odd","code":"b","history":["a","b"],"historyIndex":"1"}"#,
        )
        .unwrap();
        let project = record.into_project();

        assert_eq!(project.document.cursor(), 0);
        assert_eq!(project.document.content(), "a");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let record: ProjectRecord =
            serde_json::from_str(r#"{"id":"p1","name":"Old","code":"X","lastModified":5}"#)
                .unwrap();
        let once = record.into_project();
        let twice = ProjectRecord::from(&once).into_project();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_record_is_flattened() {
        let mut project = Project::new("p1".into(), "Site".into(), 42);
        project.document.commit("<p>v2</p>");

        let json = serde_json::to_value(ProjectRecord::from(&project)).unwrap();
        assert_eq!(json["code"], "<p>v2</p>");
        assert_eq!(json["historyIndex"], 1);
        assert_eq!(json["history"][0], PLACEHOLDER_DOCUMENT);
        assert_eq!(json["lastModified"], 42);
        assert!(json.get("document").is_none());
    }

    #[test]
    fn test_fractional_timestamp_is_accepted() {
        let record: ProjectRecord = serde_json::from_str(
            r#"{"id":"p1","name":"n","code":"c","lastModified":1700000000000.5}"#,
        )
        .unwrap();
        assert_eq!(record.last_modified, 1_700_000_000_000);
    }
}

//! # 项目仓库服务
//!
//! `ProjectStore` 持有全部项目、当前选中项目的引用以及生成后端设置，
//! 是所有用户操作（新建、删除、选择、手动编辑、撤销/重做、生成结果提交）的唯一入口。
//!
//! ## 持久化约定
//! 每个修改了存档字段的操作都会把内部的 `dirty` 标记置位。
//! 调用方（`AppState::mutate`）在操作结束后通过 `take_dirty()` 取走标记并立即写盘，
//! 因此"修改后必然持久化"是一个确定的、可脱离 UI 测试的行为。
//!
//! ## 选中引用
//! `current_project_id` 是非拥有的回指：删除被选中的项目会清空它，
//! 选择不存在的 id 是静默的无操作。

use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::document::VersionedDocument;
use crate::models::project::{Project, ProjectSummary};
use crate::models::settings::Settings;

/// 项目仓库
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    /// 项目列表：新建的项目插在最前面
    projects: Vec<Project>,
    /// 当前选中的项目 ID，`None` 表示没有选中任何项目（合法状态）
    current_project_id: Option<String>,
    settings: Settings,
    /// 自上次 `take_dirty()` 以来是否有存档字段被修改
    dirty: bool,
}

impl ProjectStore {
    /// 创建空仓库：无项目、默认设置
    pub fn new() -> Self {
        Self::default()
    }

    /// 由已迁移的存档数据构建仓库
    ///
    /// 指向不存在项目的 `current_project_id` 会被丢弃。
    pub fn from_parts(
        projects: Vec<Project>,
        settings: Settings,
        current_project_id: Option<String>,
    ) -> Self {
        let current_project_id =
            current_project_id.filter(|id| projects.iter().any(|p| &p.id == id));
        Self {
            projects,
            current_project_id,
            settings,
            dirty: false,
        }
    }

    // ======== 查询 ========

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn current_project_id(&self) -> Option<&str> {
        self.current_project_id.as_deref()
    }

    /// 当前选中的项目
    pub fn current_project(&self) -> Option<&Project> {
        self.current_project_id
            .as_deref()
            .and_then(|id| self.project(id))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 项目列表摘要，保持仓库中的顺序
    pub fn summaries(&self) -> Vec<ProjectSummary> {
        self.projects
            .iter()
            .map(|p| ProjectSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                last_modified: p.last_modified,
                active: self.current_project_id.as_deref() == Some(p.id.as_str()),
                history_index: p.document.cursor(),
                history_len: p.document.timeline().len(),
            })
            .collect()
    }

    /// 取走并清除 dirty 标记
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// 重新置位 dirty 标记（写盘失败后等待下次重试）
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // ======== 项目管理 ========

    /// 新建项目并设为当前项目
    ///
    /// 名称为空（或全为空白）时使用 `Project {n}`，n 为新建后的项目总数。
    ///
    /// # 返回值
    /// 新项目的 ID
    pub fn create_project(&mut self, name: Option<&str>) -> String {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("Project {}", self.projects.len() + 1),
        };
        let id = uuid::Uuid::new_v4().to_string();

        self.projects
            .insert(0, Project::new(id.clone(), name, now_millis()));
        self.current_project_id = Some(id.clone());
        self.dirty = true;

        log::info!("新建项目 {}", id);
        id
    }

    /// 删除项目；若为当前项目则清空选中引用
    ///
    /// # 返回值
    /// 项目存在并被删除时返回 true
    pub fn delete_project(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return false;
        }

        if self.current_project_id.as_deref() == Some(id) {
            self.current_project_id = None;
        }
        self.dirty = true;

        log::info!("删除项目 {}", id);
        true
    }

    /// 选中项目；ID 不存在时静默忽略
    pub fn select_project(&mut self, id: &str) -> bool {
        if self.project(id).is_none() {
            return false;
        }
        if self.current_project_id.as_deref() != Some(id) {
            self.current_project_id = Some(id.to_string());
            self.dirty = true;
        }
        true
    }

    // ======== 文档修改 ========

    /// 手动编辑：原地覆写当前历史槽位，刷新 `last_modified`
    pub fn apply_manual_edit(&mut self, id: &str, new_content: &str) -> bool {
        self.modify(id, true, |doc| {
            doc.patch_in_place(new_content);
            true
        })
    }

    /// 提交生成结果：追加为新的历史条目，刷新 `last_modified`
    pub fn apply_generated_result(&mut self, id: &str, new_content: &str) -> bool {
        self.modify(id, true, |doc| {
            doc.commit(new_content);
            true
        })
    }

    /// 撤销；不刷新 `last_modified`（恢复旧状态不算新的编辑）
    pub fn undo(&mut self, id: &str) -> bool {
        self.modify(id, false, |doc| doc.undo())
    }

    /// 重做；不刷新 `last_modified`
    pub fn redo(&mut self, id: &str) -> bool {
        self.modify(id, false, |doc| doc.redo())
    }

    /// 保存设置
    pub fn save_settings(&mut self, settings: Settings) {
        if self.settings != settings {
            self.settings = settings;
            self.dirty = true;
        }
    }

    /// 定位项目并对其文档执行修改
    ///
    /// `f` 返回 false 表示文档未发生变化（例如边界处的撤销）。
    fn modify<F>(&mut self, id: &str, touch: bool, f: F) -> bool
    where
        F: FnOnce(&mut VersionedDocument) -> bool,
    {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if !f(&mut project.document) {
            return false;
        }
        if touch {
            project.last_modified = now_millis();
        }
        self.dirty = true;
        true
    }
}

/// 当前 Unix 毫秒时间戳
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

//! # 文档编辑 Commands
//!
//! 作用于当前项目文档的操作：
//! - `current_document` - 读取当前文档及其历史位置
//! - `edit_code` - 手动编辑（覆写当前历史槽位，不产生撤销步骤）
//! - `undo` / `redo` - 在历史中后退/前进，边界处静默无操作
//! - `export_current` - 将当前文档导出为 `.html` 文件

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::services::export;
use crate::services::state::AppState;

/// 当前文档视图
///
/// 供编辑器和预览区渲染，`can_undo` / `can_redo` 决定工具栏按钮是否可用。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub project_id: String,
    pub name: String,
    pub content: String,
    pub history_index: usize,
    pub history_len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// 读取当前文档
///
/// # 返回值
/// 没有选中项目时返回 `None`
pub fn current_document(state: &AppState) -> Result<Option<DocumentView>, String> {
    state.read(|store| {
        store.current_project().map(|p| DocumentView {
            project_id: p.id.clone(),
            name: p.name.clone(),
            content: p.document.content().to_string(),
            history_index: p.document.cursor(),
            history_len: p.document.timeline().len(),
            can_undo: p.document.can_undo(),
            can_redo: p.document.can_redo(),
        })
    })
}

/// 手动编辑当前文档
///
/// # 错误
/// 没有选中项目时返回错误
pub fn edit_code(state: &AppState, new_content: &str) -> Result<(), String> {
    state.mutate(|store| -> Result<(), String> {
        let id = store
            .current_project_id()
            .map(str::to_string)
            .ok_or_else(|| "没有选中的项目".to_string())?;
        store.apply_manual_edit(&id, new_content);
        Ok(())
    })?
}

/// 撤销当前项目的最近一步
///
/// # 返回值
/// 实际发生了后退时返回 true；已在最旧版本或没有选中项目时返回 false
pub fn undo(state: &AppState) -> Result<bool, String> {
    state.mutate(|store| {
        let Some(id) = store.current_project_id().map(str::to_string) else {
            return false;
        };
        store.undo(&id)
    })
}

/// 重做当前项目的下一步
///
/// # 返回值
/// 实际发生了前进时返回 true
pub fn redo(state: &AppState) -> Result<bool, String> {
    state.mutate(|store| {
        let Some(id) = store.current_project_id().map(str::to_string) else {
            return false;
        };
        store.redo(&id)
    })
}

/// 将当前文档导出为 `.html` 文件
///
/// # 参数
/// - `dir` - 导出目录
///
/// # 返回值
/// 写入文件的完整路径
///
/// # 错误
/// 没有选中项目或写入失败时返回错误
pub async fn export_current(state: &AppState, dir: &Path) -> Result<PathBuf, String> {
    let (name, content) = state
        .read(|store| {
            store
                .current_project()
                .map(|p| (p.name.clone(), p.document.content().to_string()))
        })?
        .ok_or_else(|| "没有选中的项目".to_string())?;

    let path = export::write_html(dir, &name, &content).await?;
    log::info!("已导出 {}", path.display());
    Ok(path)
}

//! # 项目管理 Commands
//!
//! 提供项目的新建、列表、选择和删除操作：
//! - `create_project` - 新建项目并设为当前项目
//! - `list_projects` - 获取项目列表摘要
//! - `select_project` - 切换当前项目
//! - `request_delete` / `confirm_delete` / `cancel_delete` - 两步确认删除
//!
//! 所有修改都通过 `AppState::mutate` 执行，完成后自动写入存档。

use crate::models::project::ProjectSummary;
use crate::services::state::AppState;

/// 新建项目
///
/// # 参数
/// - `name` - 项目名称；为空时自动命名为 `Project {n}`
///
/// # 返回值
/// 新项目的 ID
pub fn create_project(state: &AppState, name: Option<&str>) -> Result<String, String> {
    state.mutate(|store| store.create_project(name))
}

/// 获取项目列表摘要（新建的在前）
pub fn list_projects(state: &AppState) -> Result<Vec<ProjectSummary>, String> {
    state.read(|store| store.summaries())
}

/// 切换当前项目
///
/// # 返回值
/// 项目存在时返回 true；不存在时静默返回 false，当前项目不变
pub fn select_project(state: &AppState, id: &str) -> Result<bool, String> {
    state.mutate(|store| store.select_project(id))
}

/// 发起删除请求，等待用户确认
///
/// # 返回值
/// 待删除项目的名称，供确认提示展示
///
/// # 错误
/// 项目不存在时返回错误
pub fn request_delete(state: &AppState, id: &str) -> Result<String, String> {
    let name = state
        .read(|store| store.project(id).map(|p| p.name.clone()))?
        .ok_or_else(|| format!("项目不存在: {}", id))?;
    state.set_pending_delete(Some(id.to_string()));
    Ok(name)
}

/// 确认删除待删除的项目
///
/// 被删除的若是当前项目，则清空当前项目（"无当前项目"是合法状态）。
///
/// # 返回值
/// 实际删除的项目 ID；没有待确认的删除时返回 `None`
pub fn confirm_delete(state: &AppState) -> Result<Option<String>, String> {
    let Some(id) = state.take_pending_delete() else {
        return Ok(None);
    };
    let deleted = state.mutate(|store| store.delete_project(&id))?;
    Ok(deleted.then_some(id))
}

/// 取消删除
pub fn cancel_delete(state: &AppState) {
    state.set_pending_delete(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::services::llm::HttpBackend;
    use crate::services::storage::MemoryStorage;

    fn state() -> AppState {
        AppState::load(Box::new(MemoryStorage::new()), Arc::new(HttpBackend::new()))
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let state = state();
        let id = create_project(&state, Some("Keep me?")).unwrap();

        assert_eq!(request_delete(&state, &id).unwrap(), "Keep me?");
        cancel_delete(&state);
        assert_eq!(confirm_delete(&state).unwrap(), None);
        assert_eq!(list_projects(&state).unwrap().len(), 1);

        request_delete(&state, &id).unwrap();
        assert_eq!(confirm_delete(&state).unwrap(), Some(id));
        assert!(list_projects(&state).unwrap().is_empty());
        assert!(state.read(|s| s.current_project_id().is_none()).unwrap());
    }

    #[test]
    fn test_request_delete_unknown_project_fails() {
        let state = state();
        assert!(request_delete(&state, "missing").is_err());
    }

    #[test]
    fn test_select_switches_active_project() {
        let state = state();
        let a = create_project(&state, None).unwrap();
        let b = create_project(&state, None).unwrap();

        assert!(select_project(&state, &a).unwrap());
        assert!(!select_project(&state, "missing").unwrap());

        let list = list_projects(&state).unwrap();
        assert_eq!(list[0].id, b);
        assert!(list[1].active);
    }
}

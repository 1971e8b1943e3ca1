//! # 应用全局状态
//!
//! `AppState` 由顶层应用上下文持有（通常包在 `Arc` 中），是所有命令函数的唯一状态来源：
//! - **仓库**：`ProjectStore`，外层 `RwLock` 保护
//! - **存储**：存档的落盘位置（`BlobStorage`）
//! - **提示词草稿**：用户正在输入的修改要求，生成成功后清空
//! - **待确认删除**：删除项目需要两步确认
//! - **编排器**：单飞的生成请求
//!
//! ## 持久化
//! 所有修改都必须经过 `mutate`：闭包执行完毕后，若仓库的 dirty 标记被置位，
//! 就在同一把写锁内编码并写入存储，保证存储里永远是最新一次提交的状态。
//! 写锁只在同步代码中持有，从不跨越 `.await`。

use std::sync::{Arc, RwLock};

use crate::services::llm::GenerationBackend;
use crate::services::orchestrator::GenerationOrchestrator;
use crate::services::persistence;
use crate::services::storage::BlobStorage;
use crate::services::store::ProjectStore;

/// 应用全局状态
pub struct AppState {
    store: RwLock<ProjectStore>,
    storage: Box<dyn BlobStorage>,
    prompt: RwLock<String>,
    pending_delete: RwLock<Option<String>>,
    orchestrator: GenerationOrchestrator,
}

impl AppState {
    /// 从存储加载状态
    ///
    /// 读取失败或存档损坏时记录错误并以空仓库启动，不会阻止应用运行。
    pub fn load(storage: Box<dyn BlobStorage>, backend: Arc<dyn GenerationBackend>) -> Self {
        let blob = match storage.load() {
            Ok(blob) => blob,
            Err(e) => {
                log::error!("{}", e);
                None
            }
        };
        let store = persistence::load_or_default(blob.as_deref());

        Self {
            store: RwLock::new(store),
            storage,
            prompt: RwLock::new(String::new()),
            pending_delete: RwLock::new(None),
            orchestrator: GenerationOrchestrator::new(backend),
        }
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    /// 只读访问仓库
    ///
    /// # 错误
    /// 锁已损坏时返回错误信息
    pub fn read<R>(&self, f: impl FnOnce(&ProjectStore) -> R) -> Result<R, String> {
        let store = self
            .store
            .read()
            .map_err(|_| "读取项目状态失败：锁已损坏".to_string())?;
        Ok(f(&store))
    }

    /// 修改仓库，并在存档字段发生变化时立即持久化
    ///
    /// 写盘失败只记录日志并保留 dirty 标记，内存中的修改仍然生效，
    /// 下一次修改会连同本次内容一起重新写入。
    ///
    /// # 错误
    /// 锁已损坏时返回错误信息
    pub fn mutate<R>(&self, f: impl FnOnce(&mut ProjectStore) -> R) -> Result<R, String> {
        let mut store = self
            .store
            .write()
            .map_err(|_| "修改项目状态失败：锁已损坏".to_string())?;
        let result = f(&mut store);

        if store.take_dirty() {
            if let Err(e) = persistence::encode(&store).and_then(|blob| self.storage.save(&blob)) {
                log::error!("保存存档失败: {}", e);
                store.mark_dirty();
            }
        }

        Ok(result)
    }

    // ======== 提示词草稿 ========

    pub fn prompt(&self) -> String {
        self.prompt
            .read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        if let Ok(mut p) = self.prompt.write() {
            *p = prompt.into();
        }
    }

    /// 清空草稿，但仅当它仍是被提交的那条提示词
    ///
    /// 生成期间用户可能已经输入了下一条修改要求，此时保留草稿。
    ///
    /// # 返回值
    /// 草稿被清空时返回 true
    pub fn clear_prompt_if(&self, consumed: &str) -> bool {
        match self.prompt.write() {
            Ok(mut p) if p.trim() == consumed => {
                p.clear();
                true
            }
            _ => false,
        }
    }

    // ======== 删除确认 ========

    /// 记录待确认删除的项目
    pub fn set_pending_delete(&self, id: Option<String>) {
        if let Ok(mut pending) = self.pending_delete.write() {
            *pending = id;
        }
    }

    /// 取走待确认删除的项目
    pub fn take_pending_delete(&self) -> Option<String> {
        self.pending_delete.write().ok()?.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::HttpBackend;
    use crate::services::storage::{BlobStorage, MemoryStorage};

    /// 与内存存储共享同一份数据，便于在测试中观察写盘内容
    struct SharedStorage(Arc<MemoryStorage>);

    impl BlobStorage for SharedStorage {
        fn load(&self) -> Result<Option<String>, String> {
            self.0.load()
        }
        fn save(&self, blob: &str) -> Result<(), String> {
            self.0.save(blob)
        }
    }

    struct FailingStorage;

    impl BlobStorage for FailingStorage {
        fn load(&self) -> Result<Option<String>, String> {
            Err("磁盘不可用".into())
        }
        fn save(&self, _blob: &str) -> Result<(), String> {
            Err("磁盘不可用".into())
        }
    }

    fn state_with(storage: Arc<MemoryStorage>) -> AppState {
        AppState::load(Box::new(SharedStorage(storage)), Arc::new(HttpBackend::new()))
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let state = state_with(storage.clone());

        let id = state.mutate(|s| s.create_project(None)).unwrap();
        let blob = storage.snapshot().unwrap();
        assert!(blob.contains(&id));

        state.mutate(|s| s.apply_generated_result(&id, "<p>v2</p>")).unwrap();
        state.mutate(|s| s.undo(&id)).unwrap();

        let reloaded = state_with(storage.clone());
        let cursor = reloaded
            .read(|s| s.project(&id).unwrap().document.cursor())
            .unwrap();
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_noop_mutation_does_not_write() {
        let storage = Arc::new(MemoryStorage::new());
        let state = state_with(storage.clone());

        state.mutate(|s| s.select_project("missing")).unwrap();
        assert!(storage.snapshot().is_none());
    }

    #[test]
    fn test_legacy_blob_is_migrated_on_load() {
        let storage = Arc::new(MemoryStorage::with_blob(
            r#"{"projects":[{"id":"p1","name":"Old","code":"X","lastModified":7}],"currentProjectId":"p1"}"#,
        ));
        let state = state_with(storage);

        let (timeline, cursor) = state
            .read(|s| {
                let doc = &s.current_project().unwrap().document;
                (doc.timeline().to_vec(), doc.cursor())
            })
            .unwrap();
        assert_eq!(timeline, ["X"]);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_unavailable_storage_does_not_block_startup_or_edits() {
        let state = AppState::load(Box::new(FailingStorage), Arc::new(HttpBackend::new()));
        assert!(state.read(|s| s.projects().is_empty()).unwrap());

        let id = state.mutate(|s| s.create_project(None)).unwrap();
        assert!(state.read(|s| s.project(&id).is_some()).unwrap());
    }

    #[test]
    fn test_prompt_and_pending_delete() {
        let state = state_with(Arc::new(MemoryStorage::new()));
        state.set_prompt("hello");
        assert_eq!(state.prompt(), "hello");
        assert!(!state.clear_prompt_if("other"));
        assert_eq!(state.prompt(), "hello");
        assert!(state.clear_prompt_if("hello"));
        assert!(state.prompt().is_empty());

        state.set_pending_delete(Some("p1".into()));
        assert_eq!(state.take_pending_delete().as_deref(), Some("p1"));
        assert!(state.take_pending_delete().is_none());
    }
}

//! # 生成编排服务
//!
//! 对当前项目发起一次生成请求，并把成功的结果作为新的历史条目提交。
//!
//! ## 状态机
//! ```text
//!            前置条件满足 + 抢到单飞标记
//!   idle ─────────────────────────────────▶ generating
//!    ▲                                           │
//!    └──────────── 后端返回（成功或失败）─────────┘
//! ```
//!
//! - 前置条件：已选中项目、提示词去除空白后非空、已配置凭据。任一不满足时保持 idle，不发请求
//! - 单飞：全局同一时刻最多一个生成请求。generating 期间的新请求直接拒绝，不排队
//! - 成功：结果提交到发起时的项目，草稿仍是本次提示词时将其清空；失败：不修改任何历史
//! - 等待后端期间不持有仓库锁，撤销/重做、手动编辑和持久化照常可用。
//!   同一项目上的并发编辑与最终提交之间以最后写入为准
//! - 没有取消：已发出的请求只能等待其返回

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::message::GenerationRequest;
use crate::models::settings::SYSTEM_PROMPT;
use crate::services::llm::{BackendError, GenerationBackend};
use crate::services::state::AppState;

/// 生成流程错误
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("请先新建或选择一个项目")]
    NoActiveProject,

    #[error("请输入修改要求")]
    EmptyPrompt,

    #[error("请先在设置中填写 API Key")]
    MissingApiKey,

    #[error("已有生成请求正在进行，请等待其完成")]
    Busy,

    #[error("生成期间项目已被删除，结果已丢弃")]
    ProjectRemoved,

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// 读取或修改应用状态失败（锁损坏）
    #[error("{0}")]
    State(String),
}

/// 一次成功生成的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// 结果被提交到的项目
    pub project_id: String,
    /// 提交后的文档正文
    pub content: String,
}

/// 生成编排器
pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    /// 单飞标记：true 表示处于 generating 状态
    generating: AtomicBool,
}

/// 单飞标记的持有者，drop 时回到 idle
///
/// 无论后端成功、失败还是 future 被中途丢弃，标记都会被释放。
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl GenerationOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            generating: AtomicBool::new(false),
        }
    }

    /// 是否有生成请求正在进行
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// 对当前项目执行一次生成
    ///
    /// 提示词取自 `AppState` 中的输入草稿。
    ///
    /// # 错误
    /// - 前置条件不满足：`NoActiveProject` / `EmptyPrompt` / `MissingApiKey`，状态不变
    /// - 已有请求在进行：`Busy`，不影响正在进行的请求
    /// - 后端失败：`Backend`，历史不变
    /// - 等待期间项目被删除：`ProjectRemoved`
    pub async fn generate(&self, state: &AppState) -> Result<GenerationOutcome, GenerateError> {
        if self.is_generating() {
            log::warn!("生成请求被拒绝：已有请求在进行");
            return Err(GenerateError::Busy);
        }

        let (project_id, request) = self.prepare(state)?;
        let _guard = self.begin()?;

        log::info!(
            "开始生成：项目 {}，模型 {}",
            project_id,
            request.model_id
        );

        let content = match self.backend.generate(&request).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("生成失败：{}", e);
                return Err(e.into());
            }
        };

        let committed = state
            .mutate(|store| store.apply_generated_result(&project_id, &content))
            .map_err(GenerateError::State)?;
        if !committed {
            log::warn!("项目 {} 在生成期间被删除", project_id);
            return Err(GenerateError::ProjectRemoved);
        }

        if !state.clear_prompt_if(&request.prompt) {
            log::debug!("提示词草稿在生成期间已被修改，保留草稿");
        }
        log::info!("生成完成：项目 {}，{} 字节", project_id, content.len());

        Ok(GenerationOutcome {
            project_id,
            content,
        })
    }

    /// 校验前置条件并从当前状态复制出请求
    fn prepare(&self, state: &AppState) -> Result<(String, GenerationRequest), GenerateError> {
        let prompt = state.prompt();
        let prompt = prompt.trim();

        state
            .read(|store| {
                let project = store
                    .current_project()
                    .ok_or(GenerateError::NoActiveProject)?;
                if prompt.is_empty() {
                    return Err(GenerateError::EmptyPrompt);
                }
                let settings = store.settings();
                if !settings.has_credentials() {
                    return Err(GenerateError::MissingApiKey);
                }

                let request = GenerationRequest {
                    system_prompt: SYSTEM_PROMPT.to_string(),
                    current_document: project.document.content().to_string(),
                    prompt: prompt.to_string(),
                    api_url: settings.api_url.clone(),
                    api_key: settings.api_key.clone(),
                    model_id: settings.model_id.clone(),
                };
                Ok((project.id.clone(), request))
            })
            .map_err(GenerateError::State)?
    }

    /// idle → generating；已在 generating 时返回 `Busy`
    fn begin(&self) -> Result<FlightGuard<'_>, GenerateError> {
        self.generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GenerateError::Busy)?;
        Ok(FlightGuard {
            flag: &self.generating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::Notify;

    use crate::models::settings::Settings;
    use crate::services::llm::BackendFuture;
    use crate::services::storage::MemoryStorage;

    /// 可控的假后端：被调用后等待 `release` 才返回
    struct GatedBackend {
        calls: AtomicUsize,
        started: Notify,
        release: Notify,
        reply: Result<String, u16>,
        gated: bool,
    }

    impl GatedBackend {
        fn new(reply: Result<&str, u16>, gated: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started: Notify::new(),
                release: Notify::new(),
                reply: reply.map(str::to_string),
                gated,
            })
        }
    }

    impl GenerationBackend for GatedBackend {
        fn generate<'a>(&'a self, request: &'a GenerationRequest) -> BackendFuture<'a> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(request.system_prompt, SYSTEM_PROMPT);
                if self.gated {
                    self.started.notify_one();
                    self.release.notified().await;
                }
                match &self.reply {
                    Ok(body) => Ok(body.clone()),
                    Err(status) => Err(BackendError::Api {
                        status: *status,
                        body: "boom".into(),
                    }),
                }
            })
        }
    }

    fn ready_state(backend: Arc<GatedBackend>) -> (AppState, String) {
        let state = AppState::load(Box::new(MemoryStorage::new()), backend);
        let id = state.mutate(|s| s.create_project(None)).unwrap();
        state
            .mutate(|s| {
                s.save_settings(Settings {
                    api_key: "sk-test".into(),
                    ..Settings::default()
                })
            })
            .unwrap();
        state.set_prompt("make it blue");
        (state, id)
    }

    #[tokio::test]
    async fn test_success_commits_and_clears_prompt() {
        let backend = GatedBackend::new(Ok("<p>blue</p>"), false);
        let (state, id) = ready_state(backend.clone());

        let outcome = state.orchestrator().generate(&state).await.unwrap();

        assert_eq!(outcome.project_id, id);
        let (timeline_len, content) = state
            .read(|s| {
                let doc = &s.project(&id).unwrap().document;
                (doc.timeline().len(), doc.content().to_string())
            })
            .unwrap();
        assert_eq!(timeline_len, 2);
        assert_eq!(content, "<p>blue</p>");
        assert!(state.prompt().is_empty());
        assert!(!state.orchestrator().is_generating());
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_history_untouched() {
        let backend = GatedBackend::new(Err(500), false);
        let (state, id) = ready_state(backend.clone());
        let before = state.read(|s| s.project(&id).unwrap().clone()).unwrap();

        let err = state.orchestrator().generate(&state).await.unwrap_err();

        assert!(matches!(err, GenerateError::Backend(BackendError::Api { status: 500, .. })));
        let after = state.read(|s| s.project(&id).unwrap().clone()).unwrap();
        assert_eq!(before, after);
        assert_eq!(state.prompt(), "make it blue");
        assert!(!state.orchestrator().is_generating());
    }

    #[tokio::test]
    async fn test_preconditions_block_request() {
        let backend = GatedBackend::new(Ok("x"), false);
        let (state, id) = ready_state(backend.clone());

        state.set_prompt("   ");
        let err = state.orchestrator().generate(&state).await.unwrap_err();
        assert!(matches!(err, GenerateError::EmptyPrompt));

        state.set_prompt("go");
        state
            .mutate(|s| s.save_settings(Settings::default()))
            .unwrap();
        let err = state.orchestrator().generate(&state).await.unwrap_err();
        assert!(matches!(err, GenerateError::MissingApiKey));

        state.mutate(|s| s.delete_project(&id)).unwrap();
        let err = state.orchestrator().generate(&state).await.unwrap_err();
        assert!(matches!(err, GenerateError::NoActiveProject));

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(!state.orchestrator().is_generating());
    }

    #[tokio::test]
    async fn test_second_request_is_rejected_while_in_flight() {
        let backend = GatedBackend::new(Ok("<p>done</p>"), true);
        let (state, id) = ready_state(backend.clone());
        let orchestrator = state.orchestrator();

        let first = orchestrator.generate(&state);
        let second = async {
            backend.started.notified().await;
            assert!(orchestrator.is_generating());

            let err = orchestrator.generate(&state).await.unwrap_err();
            assert!(matches!(err, GenerateError::Busy));
            assert!(orchestrator.is_generating());

            // 生成期间仍可撤销/编辑
            state.mutate(|s| s.apply_manual_edit(&id, "typed")).unwrap();

            backend.release.notify_one();
        };

        let (result, ()) = tokio::join!(first, second);

        assert_eq!(result.unwrap().content, "<p>done</p>");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(!orchestrator.is_generating());
        let timeline = state
            .read(|s| s.project(&id).unwrap().document.timeline().to_vec())
            .unwrap();
        assert_eq!(timeline, ["typed", "<p>done</p>"]);
    }

    #[tokio::test]
    async fn test_prompt_typed_during_flight_survives_success() {
        let backend = GatedBackend::new(Ok("<p>blue</p>"), true);
        let (state, id) = ready_state(backend.clone());

        let first = state.orchestrator().generate(&state);
        let typing = async {
            backend.started.notified().await;
            state.set_prompt("next change");
            backend.release.notify_one();
        };

        let (result, ()) = tokio::join!(first, typing);

        assert_eq!(result.unwrap().project_id, id);
        assert_eq!(state.prompt(), "next change");
    }

    #[tokio::test]
    async fn test_project_deleted_mid_flight_discards_result() {
        let backend = GatedBackend::new(Ok("<p>late</p>"), true);
        let (state, id) = ready_state(backend.clone());

        let first = state.orchestrator().generate(&state);
        let interfere = async {
            backend.started.notified().await;
            state.mutate(|s| s.delete_project(&id)).unwrap();
            backend.release.notify_one();
        };

        let (result, ()) = tokio::join!(first, interfere);
        assert!(matches!(result, Err(GenerateError::ProjectRemoved)));
        assert!(state.read(|s| s.projects().is_empty()).unwrap());
    }
}

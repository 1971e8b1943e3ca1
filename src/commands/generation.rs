//! # 生成 Commands
//!
//! - `set_prompt` - 更新提示词草稿
//! - `generate` - 以当前草稿对当前项目发起一次生成
//! - `is_generating` - 是否有生成请求正在进行（前端据此禁用发送按钮）

use crate::services::orchestrator::{GenerateError, GenerationOutcome};
use crate::services::state::AppState;

/// 更新提示词草稿
///
/// # 错误
/// 生成进行中时草稿被锁定，返回错误且不修改草稿
pub fn set_prompt(state: &AppState, prompt: &str) -> Result<(), String> {
    if is_generating(state) {
        return Err(GenerateError::Busy.to_string());
    }
    state.set_prompt(prompt);
    Ok(())
}

/// 对当前项目发起一次生成
///
/// 成功后结果成为新的历史条目，提示词草稿被清空；失败时历史和草稿都保持不变。
///
/// # 错误
/// 前置条件不满足、已有请求在进行或后端失败时返回面向用户的错误信息
pub async fn generate(state: &AppState) -> Result<GenerationOutcome, String> {
    state
        .orchestrator()
        .generate(state)
        .await
        .map_err(|e| e.to_string())
}

/// 是否有生成请求正在进行
pub fn is_generating(state: &AppState) -> bool {
    state.orchestrator().is_generating()
}

//! # 生成请求消息模型
//!
//! 定义了发送给 OpenAI 兼容 chat/completions 接口的消息结构（ChatMessage），
//! 以及一次生成请求的全部输入（GenerationRequest）。

use serde::Serialize;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 单条对话消息
///
/// 对应请求体中的：
/// ```typescript
/// interface Message {
///   role: 'system' | 'user' | 'assistant';
///   content: string;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// 一次生成请求的输入
///
/// 生成开始时从状态中复制一份，之后的等待过程不再持有任何锁。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// 系统提示词
    pub system_prompt: String,
    /// 当前文档内容，作为上下文发送；为空时不发送
    pub current_document: String,
    /// 用户输入的修改要求
    pub prompt: String,
    /// 接口地址
    pub api_url: String,
    /// 凭据
    pub api_key: String,
    /// 模型标识符
    pub model_id: String,
}

impl GenerationRequest {
    /// 组装消息列表：`[system, assistant(当前文档，可选), user(提示词)]`
    ///
    /// 上下文只带当前文档而不带完整对话，避免 token 溢出。
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::new(Role::System, self.system_prompt.clone())];
        if !self.current_document.is_empty() {
            messages.push(ChatMessage::new(
                Role::Assistant,
                self.current_document.clone(),
            ));
        }
        messages.push(ChatMessage::new(Role::User, self.prompt.clone()));
        messages
    }
}

//! # 设置数据模型
//!
//! 定义了生成后端的连接设置（Settings）以及发送给后端的系统提示词。
//! 设置是进程级的：启动时加载一次，由用户显式保存，没有历史。

use serde::{Deserialize, Serialize};

/// 默认的 OpenAI 兼容 chat/completions 接口地址
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// 默认模型标识符
pub const DEFAULT_MODEL_ID: &str = "deepseek/deepseek-r1:free";

/// 每次生成请求携带的系统提示词
pub const SYSTEM_PROMPT: &str = "You are an expert web developer specializing in modern, responsive design using Tailwind CSS. Output ONLY valid, raw HTML code (including <style> and <script> tags if needed). Do NOT wrap the code in markdown code blocks (e.g., ```html). Do NOT include explanations. Ensure the code is self-contained and works in an iframe.";

/// 生成后端设置
///
/// 对应存档中的 `settings` 对象：
/// ```typescript
/// interface Settings {
///   apiUrl: string;
///   apiKey: string;
///   modelId: string;
/// }
/// ```
///
/// 每个字段都带 `#[serde(default)]`：缺失的字段回落为默认值，而不是让整个存档加载失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// 接口地址
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// 凭据：以 `Authorization: Bearer <apiKey>` 发送，为空时禁止发起生成
    #[serde(default)]
    pub api_key: String,

    /// 模型标识符
    #[serde(default = "default_model_id")]
    pub model_id: String,
}

impl Settings {
    /// 是否已配置凭据（去除空白后非空）
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model_id: default_model_id(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

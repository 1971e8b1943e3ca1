//! # 生成后端服务
//!
//! 封装对 OpenAI 兼容 `chat/completions` 接口的一次请求/响应调用。
//!
//! ## 职责划分
//! - `GenerationBackend`：编排器依赖的抽象，输入 `GenerationRequest`，
//!   输出 `Result<String, BackendError>`（成功时为已清理的文档正文）
//! - `HttpBackend`：基于 `reqwest` 的默认实现
//! - `parse_completion` / `normalize_output`：纯函数，不涉及网络，可直接测试
//!
//! 传输层的可靠性（重试、退避）不在本模块职责内：一次调用只发一次请求。

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::message::GenerationRequest;

/// 匹配 markdown 代码围栏标记：```` ```html ````（不区分大小写）或 ```` ``` ````
///
/// 模型经常无视系统提示词，把 HTML 包在代码块里返回。
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)```(?:html)?").unwrap());

/// 错误信息中展示的响应正文最大字符数
const ERROR_PREVIEW_CHARS: usize = 100;

/// 生成后端错误
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 请求本身失败（网络、DNS、TLS 等）
    #[error("请求生成接口失败: {0}")]
    Request(#[from] reqwest::Error),

    /// 接口返回非 2xx 状态码
    #[error("API Error: {body}")]
    Api {
        /// HTTP 状态码
        status: u16,
        /// 原始响应正文
        body: String,
    },

    /// 响应正文不是合法 JSON
    #[error("Failed to parse API response as JSON: {preview}...")]
    InvalidJson {
        /// 响应正文的前若干字符
        preview: String,
    },

    /// 响应中没有 `choices[0].message.content`
    #[error("Invalid API response format: No content found.")]
    MissingContent,
}

/// 生成调用返回的 future
///
/// 装箱的 `Send` future，使 trait 可以作为 `dyn GenerationBackend` 使用。
pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>>;

/// 生成后端抽象
pub trait GenerationBackend: Send + Sync {
    /// 发起一次生成
    ///
    /// # 返回值
    /// 成功时返回经过 `normalize_output` 清理的文档正文
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> BackendFuture<'a>;
}

/// 基于 HTTP 的 OpenAI 兼容后端
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// 构建 chat/completions 请求：`Authorization: Bearer <apiKey>` + JSON 正文
    fn build_request(&self, request: &GenerationRequest) -> Result<reqwest::Request, BackendError> {
        let http_request = self
            .client
            .post(&request.api_url)
            .bearer_auth(&request.api_key)
            .json(&request_body(request))
            .build()?;
        Ok(http_request)
    }

    async fn send(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let http_request = self.build_request(request)?;
        let response = self.client.execute(http_request).await?;

        // 先按文本读取正文：出错时需要原样展示，解析失败也不至于丢失信息
        let status = response.status();
        let text = response.text().await?;

        parse_completion(status.as_u16(), status.is_success(), &text)
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationBackend for HttpBackend {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> BackendFuture<'a> {
        Box::pin(self.send(request))
    }
}

/// 请求正文：`{ model, messages }`
pub fn request_body(request: &GenerationRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model_id,
        "messages": request.messages(),
    })
}

/// 解析 chat/completions 响应
///
/// # 参数
/// - `status` - HTTP 状态码
/// - `success` - 状态码是否为 2xx
/// - `text` - 原始响应正文
///
/// # 错误
/// - 非 2xx：`BackendError::Api`
/// - 正文不是 JSON：`BackendError::InvalidJson`
/// - 缺少 `choices[0].message.content` 或内容为空：`BackendError::MissingContent`
pub fn parse_completion(status: u16, success: bool, text: &str) -> Result<String, BackendError> {
    if !success {
        return Err(BackendError::Api {
            status,
            body: text.to_string(),
        });
    }

    let data: serde_json::Value =
        serde_json::from_str(text).map_err(|_| BackendError::InvalidJson {
            preview: text.chars().take(ERROR_PREVIEW_CHARS).collect(),
        })?;

    let content = data
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(BackendError::MissingContent)?;

    Ok(normalize_output(content))
}

/// 清理生成结果：去除所有代码围栏标记，再去掉首尾空白
pub fn normalize_output(raw: &str) -> String {
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

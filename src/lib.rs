//! # AI Site Builder - 应用核心初始化模块
//!
//! 通过自然语言修改要求迭代生成单文件 HTML 页面，每个被接受的结果都进入可导航的历史。
//!
//! 本模块负责应用的完整初始化流程：
//! - 定位数据目录并加载存档（损坏或旧版存档不会阻止启动）
//! - 初始化应用全局状态（项目仓库、存储、生成编排器）
//! - 启动交互式命令行
//!
//! ## 模块结构
//! - `commands/` - 面向界面层的操作入口
//! - `models/` - 数据模型（文档历史、项目、设置、请求消息）
//! - `services/` - 核心业务逻辑（仓库、持久化、生成、导出）
//! - `utils/` - 通用工具函数

pub mod commands;
pub mod models;
pub mod services;
mod shell;
pub mod utils;

use std::sync::Arc;

use services::llm::HttpBackend;
use services::state::AppState;
use services::storage::FileStorage;

/// 应用启动函数
///
/// 1. 解析存档文件路径（`AI_SITE_BUILDER_HOME` 或系统数据目录）
/// 2. 以文件存储和 HTTP 生成后端构建 `AppState`
/// 3. 运行交互式命令行直到用户退出
///
/// # 错误
/// 无法确定数据目录或读取标准输入失败时返回错误
pub async fn run() -> Result<(), String> {
    let storage = FileStorage::new(utils::path::get_storage_path()?);
    log::info!("存档位置: {}", storage.path().display());

    let state = Arc::new(AppState::load(Box::new(storage), Arc::new(HttpBackend::new())));

    shell::run(state).await
}

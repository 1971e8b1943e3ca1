//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与命令层解耦：
//! - `store` - 项目仓库：项目集合、选中状态和所有文档修改操作
//! - `persistence` - 存档编解码：序列化、防御式解析和旧版存档迁移
//! - `storage` - 存档存储：文件（带备份）和内存两种实现
//! - `state` - 应用全局状态：仓库、存储、提示词草稿和编排器的组合，修改后自动持久化
//! - `llm` - 生成后端：OpenAI 兼容接口的请求与响应清理
//! - `orchestrator` - 生成编排：前置条件、单飞标记和结果提交
//! - `export` - 文档导出：生成文件名并写出 HTML 文件

pub mod export;
pub mod llm;
pub mod orchestrator;
pub mod persistence;
pub mod state;
pub mod storage;
pub mod store;

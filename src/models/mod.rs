//! # 数据模型模块
//!
//! 定义了与存档 JSON 结构一一对应的 Rust 数据结构，以及运行时使用的文档历史结构。
//! - `document` - 版本化文档：线性撤销/重做历史
//! - `project` - 项目的运行时结构、存档记录和列表摘要
//! - `settings` - 生成后端设置和系统提示词
//! - `message` - 发送给生成后端的消息结构

pub mod document;
pub mod message;
pub mod project;
pub mod settings;

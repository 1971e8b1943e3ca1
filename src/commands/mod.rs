//! # Command 处理模块
//!
//! 面向界面层的操作入口，每个子模块对应一个功能域：
//! - `projects` - 项目新建、列表、选择和删除
//! - `editor` - 当前文档的读取、手动编辑、撤销/重做和导出
//! - `generation` - 提示词草稿和生成请求
//! - `settings` - 生成后端设置的读写
//!
//! 所有函数以 `&AppState` 为状态来源，错误统一以面向用户的 `String` 返回。

pub mod editor;
pub mod generation;
pub mod projects;
pub mod settings;

//! # 通用工具模块
//!
//! - `path` - 数据目录和存档文件路径

pub mod path;

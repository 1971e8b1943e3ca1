//! # 文档导出服务
//!
//! 将当前项目的文档内容导出为独立的 `.html` 文件。
//! 导出是对当前状态的纯读取，不产生任何历史条目。
//!
//! ## 文件名规则
//! - 连续空白替换为单个 `-`
//! - 转为小写
//! - 去除文件系统保留字符（`/ \ : * ? " < > |` 及控制字符）
//! - 结果为空时使用 `untitled`
//! - 追加 `.html` 扩展名

use std::path::{Path, PathBuf};

/// 由项目名称生成导出文件名
///
/// # 示例
/// `"My  Landing Page"` → `"my-landing-page.html"`
pub fn export_file_name(project_name: &str) -> String {
    let stem: String = project_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();

    if stem.is_empty() || stem.chars().all(|c| c == '.' || c == '-') {
        "untitled.html".to_string()
    } else {
        format!("{}.html", stem)
    }
}

/// 将文档内容写入目标目录
///
/// 目标目录不存在时自动递归创建；同名文件会被覆盖。
///
/// # 参数
/// - `dir` - 导出目录
/// - `project_name` - 项目名称，用于生成文件名
/// - `content` - 文档内容
///
/// # 返回值
/// 写入文件的完整路径
///
/// # 错误
/// 目录创建失败或文件写入失败时返回错误
pub async fn write_html(dir: &Path, project_name: &str, content: &str) -> Result<PathBuf, String> {
    if !dir.exists() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| format!("创建导出目录失败: {}", e))?;
    }

    let path = dir.join(export_file_name(project_name));
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| format!("写入导出文件失败: {}", e))?;

    Ok(path)
}

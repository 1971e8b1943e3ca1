//! # 路径工具函数
//!
//! 提供应用数据目录和存档文件的路径：
//! - 默认使用系统数据目录下的 `ai-site-builder/`（`dirs::data_dir()`）
//! - 可通过环境变量 `AI_SITE_BUILDER_HOME` 覆盖

use std::path::PathBuf;

/// 覆盖数据目录的环境变量名
pub const HOME_ENV: &str = "AI_SITE_BUILDER_HOME";

/// 存档文件名（沿用前端 localStorage 的键名）
pub const STORAGE_FILE: &str = "ai-website-builder-data.json";

/// 获取应用数据目录的绝对路径
///
/// # 示例
/// - Windows: `C:\Users\username\AppData\Roaming\ai-site-builder`
/// - Linux: `/home/username/.local/share/ai-site-builder`
/// - macOS: `/Users/username/Library/Application Support/ai-site-builder`
///
/// # 错误
/// 未设置覆盖变量且无法确定系统数据目录时返回错误信息
pub fn get_data_dir() -> Result<PathBuf, String> {
    resolve_data_dir(std::env::var_os(HOME_ENV).map(PathBuf::from))
}

/// 获取存档文件的绝对路径
pub fn get_storage_path() -> Result<PathBuf, String> {
    Ok(get_data_dir()?.join(STORAGE_FILE))
}

/// 默认导出目录：数据目录下的 `exports/`
pub fn get_export_dir() -> Result<PathBuf, String> {
    Ok(get_data_dir()?.join("exports"))
}

fn resolve_data_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    let base = dirs::data_dir().ok_or_else(|| "无法获取系统数据目录".to_string())?;
    Ok(base.join("ai-site-builder"))
}

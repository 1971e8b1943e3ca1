//! # 设置 Commands
//!
//! 提供生成后端设置的读写以及数据目录查询：
//! - `get_data_path` - 获取应用数据目录路径
//! - `read_settings` / `save_settings` - 读写接口地址、API Key 和模型标识符
//! - `reset_settings` - 恢复默认接口地址和模型，保留 API Key
//!
//! 设置与项目存放在同一个存档中，保存后立即写盘。

use crate::models::settings::Settings;
use crate::services::state::AppState;
use crate::utils::path;

/// 获取应用数据目录的绝对路径
///
/// # 错误
/// 无法确定数据目录时返回错误信息
pub fn get_data_path() -> Result<String, String> {
    let path = path::get_data_dir()?;
    Ok(path.to_string_lossy().to_string())
}

/// 读取当前设置
pub fn read_settings(state: &AppState) -> Result<Settings, String> {
    state.read(|store| store.settings().clone())
}

/// 保存设置
///
/// 接口地址和模型标识符为空时回落为默认值，API Key 保留用户输入（去除首尾空白）。
pub fn save_settings(state: &AppState, settings: Settings) -> Result<(), String> {
    let defaults = Settings::default();
    let settings = Settings {
        api_url: non_empty_or(settings.api_url, defaults.api_url),
        api_key: settings.api_key.trim().to_string(),
        model_id: non_empty_or(settings.model_id, defaults.model_id),
    };

    state.mutate(|store| store.save_settings(settings))?;
    log::info!("设置已保存");
    Ok(())
}

/// 恢复默认设置，保留已填写的 API Key
///
/// # 返回值
/// 恢复后的设置
pub fn reset_settings(state: &AppState) -> Result<Settings, String> {
    let settings = state.mutate(|store| {
        let settings = Settings {
            api_key: store.settings().api_key.clone(),
            ..Settings::default()
        };
        store.save_settings(settings.clone());
        settings
    })?;
    log::info!("设置已恢复默认值");
    Ok(settings)
}

fn non_empty_or(value: String, fallback: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed.to_string()
    }
}

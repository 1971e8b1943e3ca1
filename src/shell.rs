//! # 交互式命令行
//!
//! 逐行读取标准输入并分派到 `commands` 层。生成请求在后台任务中执行，
//! 等待后端期间仍然可以撤销/重做、编辑、切换项目；此时再次发起生成会被拒绝。
//!
//! ```text
//! > new 落地页
//! > gen 做一个深色主题的产品介绍页
//! > undo
//! > export
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{editor, generation, projects, settings};
use crate::services::state::AppState;
use crate::utils::path;

const HELP: &str = "\
命令：
  new [名称]          新建项目并设为当前项目
  list                列出项目
  select <序号|ID>    切换当前项目
  delete <序号|ID>    删除项目（需要 yes 确认）
  show                显示当前文档
  edit <文件>         用文件内容覆盖当前文档（不产生撤销步骤）
  undo / redo         撤销 / 重做
  prompt <文本>       设置提示词
  gen [文本]          发起生成（可同时设置提示词）
  status              查看生成状态
  export [目录]       导出当前文档为 .html
  settings            查看设置
  set-url <地址>      设置接口地址
  set-key <密钥>      设置 API Key
  set-model <模型>    设置模型标识符
  reset-settings      恢复默认接口地址和模型（保留 API Key）
  help                显示帮助
  quit                退出";

/// 运行交互式命令行，直到标准输入结束或输入 `quit`
///
/// # 错误
/// 读取标准输入失败时返回错误
pub async fn run(state: Arc<AppState>) -> Result<(), String> {
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("读取输入失败: {}", e))?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        if cmd == "quit" || cmd == "exit" {
            break;
        }
        if let Err(e) = dispatch(&state, cmd, arg).await {
            println!("错误: {}", e);
        }
    }

    Ok(())
}

async fn dispatch(state: &Arc<AppState>, cmd: &str, arg: &str) -> Result<(), String> {
    // 删除确认期间，除 yes 以外的任何输入都视为取消
    if cmd != "yes" {
        projects::cancel_delete(state);
    }

    match cmd {
        "help" => println!("{}", HELP),
        "new" => {
            let name = (!arg.is_empty()).then_some(arg);
            let id = projects::create_project(state, name)?;
            println!("已新建项目 {}", id);
        }
        "list" => print_projects(state)?,
        "select" => {
            let id = resolve_project(state, arg)?;
            projects::select_project(state, &id)?;
            print_status(state)?;
        }
        "delete" => {
            let id = resolve_project(state, arg)?;
            let name = projects::request_delete(state, &id)?;
            println!("确认删除项目「{}」？此操作无法撤销。输入 yes 确认，其他任意输入取消", name);
        }
        "yes" => match projects::confirm_delete(state)? {
            Some(id) => println!("已删除项目 {}", id),
            None => println!("没有待确认的删除"),
        },
        "show" => match editor::current_document(state)? {
            Some(view) => println!("{}", view.content),
            None => println!("没有选中的项目"),
        },
        "edit" => {
            if arg.is_empty() {
                return Err("用法: edit <文件>".into());
            }
            let content = tokio::fs::read_to_string(arg)
                .await
                .map_err(|e| format!("读取文件失败: {}", e))?;
            editor::edit_code(state, &content)?;
            print_status(state)?;
        }
        "undo" => {
            if !editor::undo(state)? {
                println!("没有可撤销的步骤");
            }
            print_status(state)?;
        }
        "redo" => {
            if !editor::redo(state)? {
                println!("没有可重做的步骤");
            }
            print_status(state)?;
        }
        "prompt" => generation::set_prompt(state, arg)?,
        "gen" => {
            // 先检查单飞状态，避免被拒绝的请求覆盖草稿
            if generation::is_generating(state) {
                return Err("已有生成请求正在进行，请等待其完成".into());
            }
            if !arg.is_empty() {
                generation::set_prompt(state, arg)?;
            }
            spawn_generation(state.clone());
        }
        "status" => {
            if generation::is_generating(state) {
                println!("正在生成……");
            }
            print_status(state)?;
        }
        "export" => {
            let dir = if arg.is_empty() {
                path::get_export_dir()?
            } else {
                PathBuf::from(arg)
            };
            let file = editor::export_current(state, &dir).await?;
            println!("已导出到 {}", file.display());
        }
        "reset-settings" => {
            settings::reset_settings(state)?;
            println!("设置已恢复默认值（API Key 保留）");
        }
        "settings" => {
            let s = settings::read_settings(state)?;
            let key = if s.api_key.is_empty() { "(未设置)" } else { "******" };
            println!("接口地址: {}\nAPI Key: {}\n模型: {}", s.api_url, key, s.model_id);
            println!("数据目录: {}", settings::get_data_path()?);
        }
        "set-url" | "set-key" | "set-model" => {
            let mut s = settings::read_settings(state)?;
            match cmd {
                "set-url" => s.api_url = arg.to_string(),
                "set-key" => s.api_key = arg.to_string(),
                _ => s.model_id = arg.to_string(),
            }
            settings::save_settings(state, s)?;
            println!("设置已保存");
        }
        _ => return Err(format!("未知命令: {}（输入 help 查看帮助）", cmd)),
    }
    Ok(())
}

/// 在后台任务中执行生成，完成后打印结果
fn spawn_generation(state: Arc<AppState>) {
    println!("正在生成……");
    tokio::spawn(async move {
        match generation::generate(&state).await {
            Ok(outcome) => println!(
                "生成完成（{} 字节），输入 show 查看，undo 可撤销",
                outcome.content.len()
            ),
            Err(e) => println!("生成失败: {}", e),
        }
    });
}

/// 按 1 开始的序号或项目 ID 查找项目
fn resolve_project(state: &AppState, arg: &str) -> Result<String, String> {
    let list = projects::list_projects(state)?;
    let by_index = arg
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| list.get(i));
    by_index
        .or_else(|| list.iter().find(|p| p.id == arg))
        .map(|p| p.id.clone())
        .ok_or_else(|| format!("找不到项目: {}", arg))
}

fn print_projects(state: &AppState) -> Result<(), String> {
    let list = projects::list_projects(state)?;
    if list.is_empty() {
        println!("还没有项目，输入 new 新建");
    }
    for (i, p) in list.iter().enumerate() {
        let marker = if p.active { "*" } else { " " };
        println!(
            "{} {:>2}. {}  [{}/{}]  {}",
            marker,
            i + 1,
            p.name,
            p.history_index + 1,
            p.history_len,
            p.id
        );
    }
    Ok(())
}

fn print_status(state: &AppState) -> Result<(), String> {
    match editor::current_document(state)? {
        Some(view) => println!(
            "当前项目: {}  历史 {}/{}  撤销:{} 重做:{}",
            view.name,
            view.history_index + 1,
            view.history_len,
            if view.can_undo { "可用" } else { "否" },
            if view.can_redo { "可用" } else { "否" },
        ),
        None => println!("没有选中的项目"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::services::llm::HttpBackend;
    use crate::services::storage::MemoryStorage;

    #[test]
    fn test_resolve_project_by_index_or_id() {
        let state = AppState::load(Box::new(MemoryStorage::new()), Arc::new(HttpBackend::new()));
        let older = projects::create_project(&state, None).unwrap();
        let newer = projects::create_project(&state, None).unwrap();

        assert_eq!(resolve_project(&state, "1").unwrap(), newer);
        assert_eq!(resolve_project(&state, "2").unwrap(), older);
        assert_eq!(resolve_project(&state, &older).unwrap(), older);
        assert!(resolve_project(&state, "0").is_err());
        assert!(resolve_project(&state, "9").is_err());
    }
}

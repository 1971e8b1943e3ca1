//! # AI Site Builder - 命令行入口点
//!
//! `main.rs` 只负责安装日志后端并启动运行时，核心逻辑位于 `lib.rs` 中。
//! 日志级别通过 `RUST_LOG` 控制，默认 `info`。

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = app_lib::run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

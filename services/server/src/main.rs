//! productd 二进制入口：解析命令并启动应用。

mod api;
mod app;
mod auth;
mod cli;
mod config;
mod logging;
mod products;
mod state;

#[tokio::main]
/// 启动 productd 服务。
async fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    match cli::dispatch(&args)? {
        cli::CliDispatch::Run => {}
        cli::CliDispatch::Exit => return Ok(()),
    }

    let config = config::Config::from_env()?;
    let _log_runtime = logging::init("server")?;
    app::run(config).await
}

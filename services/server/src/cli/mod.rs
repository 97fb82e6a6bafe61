//! server CLI 分发：`run`、`doctor`、`issue-token`、`version`。

use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use serde_json::json;

use crate::{
    auth::{
        clock::SystemClock,
        principal::PrincipalDirectory,
        token::{IssuedToken, TokenService},
    },
    config::{Config, SecretSource, TOKEN_SECRET_ENV, normalize_ttl_sec},
};

/// CLI 分发结果。
pub(crate) enum CliDispatch {
    /// 继续进入 server 主循环。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 已解析的子命令。
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run,
    Help,
    Version,
    Doctor(DoctorFormat),
    IssueToken { subject: String, ttl_sec: Option<u64> },
}

/// `doctor` 输出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoctorFormat {
    Text,
    Json,
}

/// 解析并执行 server CLI。
pub(crate) fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    match parse_command(args)? {
        Command::Run => Ok(CliDispatch::Run),
        Command::Help => {
            print_root_help();
            Ok(CliDispatch::Exit)
        }
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        Command::Doctor(format) => {
            run_doctor(&Config::from_env()?, format);
            Ok(CliDispatch::Exit)
        }
        Command::IssueToken { subject, ttl_sec } => {
            let issued = issue_token_for(&Config::from_env()?, &subject, ttl_sec)?;
            println!("{}", issued.token);
            Ok(CliDispatch::Exit)
        }
    }
}

/// 解析命令行参数。
fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let Some(cmd) = args.first().map(|raw| raw.trim()) else {
        return Ok(Command::Run);
    };
    match cmd {
        "" | "run" => Ok(Command::Run),
        "-h" | "--help" | "help" => Ok(Command::Help),
        "version" => Ok(Command::Version),
        "doctor" => Ok(Command::Doctor(parse_doctor_format(&args[1..])?)),
        "issue-token" => parse_issue_token(&args[1..]),
        other => Err(anyhow!(
            "unknown command: {other}; run `pd-server --help` for usage"
        )),
    }
}

/// 解析 doctor 的 `--format` 参数。
fn parse_doctor_format(args: &[String]) -> anyhow::Result<DoctorFormat> {
    if args.is_empty() {
        return Ok(DoctorFormat::Text);
    }
    if args.len() == 2 && args[0] == "--format" {
        return match args[1].as_str() {
            "text" => Ok(DoctorFormat::Text),
            "json" => Ok(DoctorFormat::Json),
            other => Err(anyhow!("unsupported doctor format: {other}")),
        };
    }
    Err(anyhow!("usage: pd-server doctor [--format text|json]"))
}

/// 解析 `issue-token <subject> [--ttl <sec>]`。
fn parse_issue_token(args: &[String]) -> anyhow::Result<Command> {
    let usage = || anyhow!("usage: pd-server issue-token <subject> [--ttl <sec>]");
    let subject = args
        .first()
        .map(|raw| raw.trim())
        .filter(|value| !value.is_empty() && !value.starts_with('-'))
        .ok_or_else(usage)?;
    let ttl_sec = match &args[1..] {
        [] => None,
        [flag, value] if flag == "--ttl" => Some(
            value
                .parse::<u64>()
                .map_err(|_| anyhow!("invalid --ttl: {value}"))?,
        ),
        _ => return Err(usage()),
    };
    Ok(Command::IssueToken {
        subject: subject.to_string(),
        ttl_sec,
    })
}

/// 用已配置的密钥为目录中的主体签发 token。
fn issue_token_for(
    config: &Config,
    subject: &str,
    ttl_sec: Option<u64>,
) -> anyhow::Result<IssuedToken> {
    if config.secret_source != SecretSource::Env {
        bail!("{TOKEN_SECRET_ENV} must be set; a random secret would not match the server");
    }
    let record = config
        .principals
        .lookup(subject)
        .ok_or_else(|| anyhow!("unknown principal: {subject}"))?;
    let ttl_sec = ttl_sec.map_or(config.token_ttl_sec, |ttl| normalize_ttl_sec(Some(ttl)));
    TokenService::new(config.secret.clone(), Arc::new(SystemClock))
        .issue(&record.subject, record.attributes, ttl_sec)
        .context("issue token failed")
}

/// 打印 doctor 信息（密钥只显示来源）。
fn run_doctor(config: &Config, format: DoctorFormat) {
    let secret_source = match config.secret_source {
        SecretSource::Env => "env",
        SecretSource::Generated => "generated",
    };
    let principals = config.principals.subjects();

    match format {
        DoctorFormat::Text => {
            println!("listen-addr: {}", config.addr);
            println!("token-secret: {secret_source}");
            println!("token-ttl-sec: {}", config.token_ttl_sec);
            println!("principals: {}", principals.join(","));
        }
        DoctorFormat::Json => {
            let payload = json!({
                "listenAddr": config.addr,
                "tokenSecret": secret_source,
                "tokenTtlSec": config.token_ttl_sec,
                "principals": principals,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

/// 打印 root help。
fn print_root_help() {
    println!("pd-server usage:");
    println!("  pd-server run");
    println!("  pd-server doctor [--format text|json]");
    println!("  pd-server issue-token <subject> [--ttl <sec>]");
    println!("  pd-server version");
}

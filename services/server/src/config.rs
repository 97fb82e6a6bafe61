//! 配置模块职责：
//! 1. 读取 server 运行所需的环境变量并提供默认值。
//! 2. 构造共享签名密钥与主体目录（启动时一次性完成，之后只读）。
//! 3. 提供 TTL 等数值的归一化。

use std::{fmt, sync::Arc};

use anyhow::{Context, anyhow};
use tracing::warn;

use crate::{
    api::types::{DEFAULT_ADDR, DEFAULT_TOKEN_TTL_SEC, MAX_TOKEN_TTL_SEC, MIN_TOKEN_TTL_SEC},
    auth::{
        principal::{StaticDirectory, parse_principals},
        secret::SharedSecret,
    },
};

/// 监听地址环境变量。
const ADDR_ENV: &str = "PD_ADDR";
/// 共享密钥环境变量。
pub(crate) const TOKEN_SECRET_ENV: &str = "PD_TOKEN_SECRET";
/// token 有效期环境变量。
const TOKEN_TTL_ENV: &str = "PD_TOKEN_TTL_SEC";
/// 主体列表环境变量。
const PRINCIPALS_ENV: &str = "PD_PRINCIPALS";
/// 未配置主体时的开发默认值。
const DEFAULT_PRINCIPALS: &str = "admin:admin:role=admin";

/// 共享密钥来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SecretSource {
    Env,
    Generated,
}

/// Server 运行时配置。
#[derive(Clone)]
pub(crate) struct Config {
    /// 监听地址。
    pub(crate) addr: String,
    /// 签名密钥。
    pub(crate) secret: Arc<SharedSecret>,
    pub(crate) secret_source: SecretSource,
    /// 登录签发的 token 有效期（秒）。
    pub(crate) token_ttl_sec: u64,
    /// 主体目录。
    pub(crate) principals: Arc<StaticDirectory>,
    /// 是否使用了内置默认主体。
    pub(crate) default_principals: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("secret", &self.secret)
            .field("secret_source", &self.secret_source)
            .field("token_ttl_sec", &self.token_ttl_sec)
            .field("principals", &self.principals.subjects())
            .finish()
    }
}

impl Config {
    /// 从环境变量构建配置。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置（便于测试注入）。
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let addr = read(ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let (secret, secret_source) = match lookup(TOKEN_SECRET_ENV) {
            Some(raw) => (
                SharedSecret::new(raw)
                    .ok_or_else(|| anyhow!("{TOKEN_SECRET_ENV} must not be blank"))?,
                SecretSource::Env,
            ),
            None => (SharedSecret::generate(), SecretSource::Generated),
        };

        let token_ttl_sec = match read(TOKEN_TTL_ENV) {
            Some(raw) => normalize_ttl_sec(Some(
                raw.parse::<u64>()
                    .with_context(|| format!("invalid {TOKEN_TTL_ENV}: {raw}"))?,
            )),
            None => normalize_ttl_sec(None),
        };

        let raw_principals = read(PRINCIPALS_ENV);
        let default_principals = raw_principals.is_none();
        let records = parse_principals(raw_principals.as_deref().unwrap_or(DEFAULT_PRINCIPALS))
            .with_context(|| format!("parse {PRINCIPALS_ENV}"))?;

        Ok(Self {
            addr,
            secret: Arc::new(secret),
            secret_source,
            token_ttl_sec,
            principals: Arc::new(StaticDirectory::new(records)),
            default_principals,
        })
    }

    /// 对开发默认值给出告警。
    pub(crate) fn warn_insecure_defaults(&self) {
        if self.secret_source == SecretSource::Generated {
            warn!("{TOKEN_SECRET_ENV} not set; using a random per-process secret");
        }
        if self.default_principals {
            warn!("{PRINCIPALS_ENV} not set; using built-in development principal");
        }
    }
}

/// 归一化 TTL（秒）。
pub(crate) fn normalize_ttl_sec(raw: Option<u64>) -> u64 {
    raw.unwrap_or(DEFAULT_TOKEN_TTL_SEC)
        .clamp(MIN_TOKEN_TTL_SEC, MAX_TOKEN_TTL_SEC)
}

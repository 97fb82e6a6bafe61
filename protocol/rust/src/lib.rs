// 文件职责：
// 1) 定义 server 与调用方共用的协议数据结构（凭证声明、商品、登录）。
// 2) 提供时间戳等跨端一致的基础函数。
// 3) 作为 Rust 侧协议唯一代码源，供其他服务复用。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `Authorization` 头中要求的鉴权方案（大小写敏感）。
pub const AUTH_SCHEME: &str = "Bearer";
/// token 头部声明的签名算法。
pub const TOKEN_ALG: &str = "HS256";
/// token 头部声明的类型。
pub const TOKEN_TYP: &str = "JWT";

/// 签名 token 头部段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    // 签名算法。
    pub alg: String,
    // token 类型。
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: TOKEN_ALG.to_string(),
            typ: TOKEN_TYP.to_string(),
        }
    }
}

/// 凭证声明：签发后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialClaim {
    // 主体标识。
    pub subject: String,
    // 签发时间（unix 秒）。
    pub issued_at: u64,
    // 过期时间（unix 秒，等于该值时仍有效）。
    pub expires_at: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    // 附加属性（如 role），有序以保证序列化稳定。
    pub attributes: BTreeMap<String, String>,
}

/// 登录请求。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub proof: Option<String>,
}

/// 登录成功返回。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub token_type: String,
    pub expires_in_sec: u64,
    // 过期时间（RFC3339）。
    pub expires_at: String,
}

/// 商品记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    // 创建者主体（来自已校验的凭证声明）。
    pub created_by: String,
    // 最近修改者主体。
    pub updated_by: String,
}

/// 创建商品请求：字段缺失由 server 做存在性校验。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 更新商品请求：仅覆盖提供的字段。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateProductRequest {
    /// 是否未携带任何可更新字段。
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.description.is_none()
    }
}

/// 生成纳秒精度 UTC 时间戳（RFC3339）。
pub fn now_rfc3339_nanos() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

/// unix 秒转 RFC3339；越界时返回空串。
pub fn unix_to_rfc3339(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default()
}

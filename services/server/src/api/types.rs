//! 服务内部常量。

/// 默认 token 有效期（秒）。
pub(crate) const DEFAULT_TOKEN_TTL_SEC: u64 = 3600;
/// token 有效期下限（秒）。
pub(crate) const MIN_TOKEN_TTL_SEC: u64 = 60;
/// token 有效期上限（秒）。
pub(crate) const MAX_TOKEN_TTL_SEC: u64 = 24 * 3600;
/// 默认监听地址。
pub(crate) const DEFAULT_ADDR: &str = "0.0.0.0:18080";
/// 商品名称最大字符数。
pub(crate) const MAX_PRODUCT_NAME_CHARS: usize = 200;

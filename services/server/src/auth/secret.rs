//! 共享签名密钥：启动时构造一次，之后只读。

use std::fmt;

/// HMAC 共享密钥；`Debug` 输出脱敏，避免进入日志。
#[derive(Clone)]
pub(crate) struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// 从配置值构造；空白密钥无效。
    pub(crate) fn new(raw: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = raw.into();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(Self(bytes))
    }

    /// 生成进程内随机密钥（重启即失效）。
    pub(crate) fn generate() -> Self {
        Self(
            format!(
                "pd_sk_{}{}",
                uuid::Uuid::new_v4().simple(),
                uuid::Uuid::new_v4().simple()
            )
            .into_bytes(),
        )
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

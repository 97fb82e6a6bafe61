//! 可注入时钟：生产读系统时间，测试手动推进。

/// unix 秒时钟。
pub(crate) trait Clock: Send + Sync {
    /// 当前 unix 秒。
    fn now_unix(&self) -> u64;
}

/// 系统墙钟。
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;

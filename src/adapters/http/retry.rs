use crate::config::HttpConfig;
use std::time::Duration;

/// 指數退避上限為基準延遲的 64 倍
const MAX_BACKOFF_SHIFT: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 總嘗試次數 (含第一次)，至少 1
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// 第 `attempt` 次失敗後 (從 1 起算) 要等待的時間
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.base_delay * (1u32 << shift)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self::new(
            config.retry_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }
}

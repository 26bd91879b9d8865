//! 指數退避重試策略

use std::future::Future;
use std::time::Duration;

/// 預設最多嘗試次數
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// 預設基礎延遲
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// 可判斷是否值得重試的錯誤
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for mess_core::MessError {
    fn is_retryable(&self) -> bool {
        mess_core::MessError::is_retryable(self)
    }
}

/// 重試策略
///
/// 第 n 次失敗後等待 `base_delay * multiplier^(n-1)`，最後一次失敗後
/// 不再等待，直接回傳原始錯誤。不可重試的錯誤立即回傳。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// 最多嘗試次數（含第一次）
    pub max_attempts: u32,

    /// 基礎延遲
    pub base_delay: Duration,

    /// 每次重試的延遲倍數
    pub multiplier: u32,
}

impl RetryPolicy {
    /// 不重試
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// 建構器模式：設置最多嘗試次數（至少 1）
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// 建構器模式：設置基礎延遲
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// 建構器模式：設置延遲倍數
    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// 第 `attempt` 次（從 1 起算）失敗後的等待時間
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// 執行並依策略重試
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(
                        "第 {}/{} 次嘗試失敗，{:?} 後重試: {}",
                        attempt,
                        self.max_attempts,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: 2,
        }
    }
}

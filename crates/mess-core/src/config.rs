//! 伙食系統配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{MessError, Result};

/// 每日費率環境變數
pub const ENV_AMOUNT_PER_DAY: &str = "MESS_AMOUNT_PER_DAY";

/// 服務監聽位址環境變數
pub const ENV_BIND_ADDR: &str = "MESS_BIND_ADDR";

/// 住宿生名冊檔案環境變數（JSON 陣列）
pub const ENV_RESIDENTS_FILE: &str = "MESS_RESIDENTS_FILE";

/// 預設每日費率
pub const DEFAULT_AMOUNT_PER_DAY: i64 = 50;

/// 預設監聽位址
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// 伙食系統配置
///
/// 費率是全機構單一值，不區分住宿生或週期。計算帳單時由呼叫端
/// 明確傳入，調整後只影響之後計算的帳單。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessConfig {
    /// 每日費率
    pub amount_per_day: Decimal,

    /// 服務監聽位址
    pub bind_addr: String,

    /// 住宿生名冊檔案
    pub residents_file: Option<String>,
}

impl MessConfig {
    /// 創建新的配置
    pub fn new(amount_per_day: Decimal) -> Self {
        Self {
            amount_per_day,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            residents_file: None,
        }
    }

    /// 建構器模式：設置每日費率
    ///
    /// # 範例
    /// ```
    /// # use mess_core::MessConfig;
    /// # use rust_decimal::Decimal;
    /// let config = MessConfig::default().with_amount_per_day(Decimal::new(4250, 2));
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn with_amount_per_day(mut self, amount: Decimal) -> Self {
        self.amount_per_day = amount;
        self
    }

    /// 建構器模式：設置監聽位址
    pub fn with_bind_addr(mut self, addr: String) -> Self {
        self.bind_addr = addr;
        self
    }

    /// 建構器模式：設置住宿生名冊檔案
    pub fn with_residents_file(mut self, path: String) -> Self {
        self.residents_file = Some(path);
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        validate_rate(self.amount_per_day)
    }

    /// 從環境變數載入配置（未設定的項目使用預設值）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 從任意鍵值來源載入配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_AMOUNT_PER_DAY) {
            let amount = Decimal::from_str(raw.trim()).map_err(|e| {
                MessError::Validation(format!("{}='{}': {}", ENV_AMOUNT_PER_DAY, raw, e))
            })?;
            config = config.with_amount_per_day(amount);
        }

        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            config = config.with_bind_addr(addr.trim().to_string());
        }

        if let Some(path) = lookup(ENV_RESIDENTS_FILE) {
            config = config.with_residents_file(path.trim().to_string());
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for MessConfig {
    fn default() -> Self {
        Self::new(Decimal::from(DEFAULT_AMOUNT_PER_DAY))
    }
}

/// 驗證費率（不得為負數）
pub fn validate_rate(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(MessError::Validation(format!(
            "amount_per_day must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MessConfig::default();

        assert_eq!(config.amount_per_day, Decimal::from(50));
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MessConfig::default()
            .with_amount_per_day(Decimal::from(75))
            .with_bind_addr("0.0.0.0:8080".to_string());

        assert_eq!(config.amount_per_day, Decimal::from(75));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_negative_rate_rejected() {
        let config = MessConfig::new(Decimal::from(-1));
        assert!(config.validate().unwrap_err().is_validation());

        // 零費率允許（免費供餐）
        assert!(MessConfig::new(Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn test_load_from_lookup() {
        let config = MessConfig::from_lookup(lookup_from(&[
            (ENV_AMOUNT_PER_DAY, " 62.5 "),
            (ENV_BIND_ADDR, "0.0.0.0:9000"),
            (ENV_RESIDENTS_FILE, "residents.json"),
        ]))
        .unwrap();

        assert_eq!(config.amount_per_day, Decimal::new(625, 1));
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.residents_file.as_deref(), Some("residents.json"));
    }

    #[test]
    fn test_load_from_lookup_defaults() {
        let config = MessConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, MessConfig::default());
    }

    #[test]
    fn test_load_from_lookup_rejects_garbage() {
        assert!(MessConfig::from_lookup(lookup_from(&[(ENV_AMOUNT_PER_DAY, "fifty")])).is_err());
        assert!(MessConfig::from_lookup(lookup_from(&[(ENV_AMOUNT_PER_DAY, "-5")])).is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = MessConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: MessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

//! # Mess Core
//!
//! 核心資料模型與類型定義

pub mod bill;
pub mod calendar;
pub mod config;
pub mod meal;
pub mod record;
pub mod resident;

// Re-export 主要類型
pub use bill::{BillLedgerEntry, MonthlyBill};
pub use calendar::{parse_date, BillingPeriod};
pub use config::MessConfig;
pub use meal::{DayStatus, MealMark, MealType};
pub use record::{AttendanceDay, LeaveRecord, MealRecord};
pub use resident::{AccountStatus, Resident};

/// 伙食系統錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MessError {
    #[error("輸入驗證失敗: {0}")]
    Validation(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("找不到住宿生: {0}")]
    ResidentNotFound(String),

    #[error("儲存層無法使用: {0}")]
    StorageUnavailable(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl MessError {
    /// 是否為可重試的錯誤（僅限儲存層/連線問題）
    pub fn is_retryable(&self) -> bool {
        matches!(self, MessError::StorageUnavailable(_))
    }

    /// 是否為輸入驗證類錯誤
    pub fn is_validation(&self) -> bool {
        matches!(self, MessError::Validation(_) | MessError::InvalidDate(_))
    }
}

pub type Result<T> = std::result::Result<T, MessError>;

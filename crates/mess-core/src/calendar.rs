//! 計費週期與日期工具

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MessError, Result};

/// 支援的最早年份
pub const MIN_YEAR: i32 = 1970;

/// 支援的最晚年份
pub const MAX_YEAR: i32 = 9999;

/// 日期格式（YYYY-MM-DD）
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析 `YYYY-MM-DD` 格式的日期
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    // chrono 接受不補零、帶空白或正負號的欄位，這裡要求逐字元符合 YYYY-MM-DD
    if !is_date_shaped(input) {
        return Err(MessError::InvalidDate(format!(
            "'{}' is not in YYYY-MM-DD form",
            input
        )));
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| MessError::InvalidDate(format!("'{}': {}", input, e)))
}

fn is_date_shaped(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// 計費週期（某年某月）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// 年份（排序時優先）
    pub year: i32,

    /// 月份（1-12）
    pub month: u32,
}

impl BillingPeriod {
    /// 創建新的計費週期（驗證月份與年份範圍）
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(MessError::Validation(format!(
                "month {} is out of range 1-12",
                month
            )));
        }

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(MessError::Validation(format!(
                "year {} is out of range {}-{}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }

        Ok(Self { year, month })
    }

    /// 取得日期所屬的計費週期
    pub fn containing(date: NaiveDate) -> Result<Self> {
        Self::new(date.month(), date.year())
    }

    /// 週期第一天
    pub fn first_day(&self) -> NaiveDate {
        // 月份與年份已在建構時驗證
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// 下一個週期
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// 週期最後一天
    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(first)
    }

    /// 該月的日曆天數（含閏年）
    pub fn total_days(&self) -> u32 {
        self.last_day().day()
    }

    /// 檢查日期是否在週期內
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// 週期內的所有日期（依序）
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first_day().iter_days().take_while(move |d| *d <= last)
    }

    /// 週期是否已在指定日期之前結束
    pub fn has_ended_before(&self, as_of: NaiveDate) -> bool {
        self.last_day() < as_of
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

//! 餐別與出席標記

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MessError;

/// 餐別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// 早餐
    Breakfast,
    /// 午餐
    Lunch,
    /// 晚餐
    Dinner,
}

impl MealType {
    /// 一天中的所有餐別（依時間順序）
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = MessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(MessError::Validation(format!(
                "unknown meal type '{}', expected breakfast, lunch or dinner",
                other
            ))),
        }
    }
}

/// 單餐出席標記
///
/// 餐別層級只有出席/缺席，請假是日層級的衍生概念。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealMark {
    /// 出席
    Present,
    /// 缺席（未標記時的預設值）
    #[default]
    Absent,
}

impl MealMark {
    pub fn is_present(&self) -> bool {
        *self == MealMark::Present
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealMark::Present => "present",
            MealMark::Absent => "absent",
        }
    }
}

impl fmt::Display for MealMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealMark {
    type Err = MessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(MealMark::Present),
            "absent" => Ok(MealMark::Absent),
            other => Err(MessError::Validation(format!(
                "unknown attendance status '{}', expected present or absent",
                other
            ))),
        }
    }
}

/// 日出席狀態（由三餐標記與請假紀錄推導）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// 出席（至少一餐出席）
    Present,
    /// 缺席
    Absent,
    /// 請假（覆蓋餐別標記）
    Leave,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Present => "present",
            DayStatus::Absent => "absent",
            DayStatus::Leave => "leave",
        }
    }

    /// 是否計費（只有出席日計費）
    pub fn is_billable(&self) -> bool {
        *self == DayStatus::Present
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

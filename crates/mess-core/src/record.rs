//! 用餐紀錄與請假紀錄模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{DayStatus, MealMark, MealType};

/// 用餐紀錄（每位住宿生每天一筆）
///
/// 第一次寫入任一餐別時建立，之後只會被覆寫，不會刪除。
/// 日出席狀態不存放在這裡，讀取時再由三餐標記推導。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    /// 住宿生ID
    pub resident_id: String,

    /// 日期
    pub date: NaiveDate,

    /// 早餐
    pub breakfast: MealMark,

    /// 午餐
    pub lunch: MealMark,

    /// 晚餐
    pub dinner: MealMark,
}

impl MealRecord {
    /// 創建新的用餐紀錄（三餐皆為缺席）
    pub fn new(resident_id: String, date: NaiveDate) -> Self {
        Self {
            resident_id,
            date,
            breakfast: MealMark::Absent,
            lunch: MealMark::Absent,
            dinner: MealMark::Absent,
        }
    }

    /// 建構器模式：設置單餐標記
    pub fn with_mark(mut self, meal: MealType, mark: MealMark) -> Self {
        self.set_mark(meal, mark);
        self
    }

    /// 讀取單餐標記
    pub fn mark(&self, meal: MealType) -> MealMark {
        match meal {
            MealType::Breakfast => self.breakfast,
            MealType::Lunch => self.lunch,
            MealType::Dinner => self.dinner,
        }
    }

    /// 覆寫單餐標記，回傳值表示內容是否有變化
    pub fn set_mark(&mut self, meal: MealType, mark: MealMark) -> bool {
        let slot = match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
        };
        let changed = *slot != mark;
        *slot = mark;
        changed
    }

    /// 三餐標記（早、午、晚）
    pub fn marks(&self) -> [MealMark; 3] {
        [self.breakfast, self.lunch, self.dinner]
    }
}

/// 請假紀錄
///
/// 存在時強制該日狀態為請假，覆蓋三餐標記。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// 住宿生ID
    pub resident_id: String,

    /// 日期
    pub date: NaiveDate,

    /// 請假原因
    pub reason: Option<String>,
}

impl LeaveRecord {
    /// 創建新的請假紀錄
    pub fn new(resident_id: String, date: NaiveDate) -> Self {
        Self {
            resident_id,
            date,
            reason: None,
        }
    }

    /// 建構器模式：設置請假原因
    pub fn with_reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }
}

/// 單日出席檢視（用餐紀錄 + 推導出的日狀態）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceDay {
    pub resident_id: String,
    pub date: NaiveDate,
    pub breakfast: MealMark,
    pub lunch: MealMark,
    pub dinner: MealMark,
    pub day_status: DayStatus,
}

impl AttendanceDay {
    /// 由用餐紀錄與已推導的日狀態組成
    pub fn from_record(record: &MealRecord, day_status: DayStatus) -> Self {
        Self {
            resident_id: record.resident_id.clone(),
            date: record.date,
            breakfast: record.breakfast,
            lunch: record.lunch,
            dinner: record.dinner,
            day_status,
        }
    }
}

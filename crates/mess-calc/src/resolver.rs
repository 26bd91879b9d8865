//! 日狀態推導

use mess_core::{DayStatus, MealMark, MealRecord};

/// 日狀態推導器
///
/// 純函數：至少一餐出席即為出席，否則缺席；有請假紀錄時一律為請假。
pub struct DayStatusResolver;

impl DayStatusResolver {
    /// 由三餐標記推導日狀態
    pub fn resolve(breakfast: MealMark, lunch: MealMark, dinner: MealMark) -> DayStatus {
        if breakfast.is_present() || lunch.is_present() || dinner.is_present() {
            DayStatus::Present
        } else {
            DayStatus::Absent
        }
    }

    /// 推導日狀態（含請假覆蓋）
    pub fn resolve_with_leave(marks: [MealMark; 3], on_leave: bool) -> DayStatus {
        if on_leave {
            return DayStatus::Leave;
        }
        let [breakfast, lunch, dinner] = marks;
        Self::resolve(breakfast, lunch, dinner)
    }

    /// 推導某日狀態；沒有用餐紀錄的日期視為三餐缺席
    pub fn resolve_record(record: Option<&MealRecord>, on_leave: bool) -> DayStatus {
        let marks = record
            .map(MealRecord::marks)
            .unwrap_or([MealMark::Absent; 3]);
        Self::resolve_with_leave(marks, on_leave)
    }
}

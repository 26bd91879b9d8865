//! 月帳單與帳單歷史模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AttendanceDay, BillingPeriod};

/// 月帳單（隨需計算，不存放）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBill {
    /// 住宿生ID
    pub resident_id: String,

    /// 月份
    pub month: u32,

    /// 年份
    pub year: i32,

    /// 當月日曆天數
    pub total_days: u32,

    /// 出席天數
    pub present_days: u32,

    /// 請假天數
    pub leave_days: u32,

    /// 每日費率
    pub amount_per_day: Decimal,

    /// 應繳金額 = 出席天數 × 每日費率
    pub total_amount: Decimal,

    /// 週期內的出席明細（依日期排序）
    pub attendance: Vec<AttendanceDay>,
}

impl MonthlyBill {
    /// 由週期與統計結果建立帳單，金額在此計算
    pub fn new(
        resident_id: String,
        period: BillingPeriod,
        present_days: u32,
        leave_days: u32,
        amount_per_day: Decimal,
    ) -> Self {
        Self {
            resident_id,
            month: period.month,
            year: period.year,
            total_days: period.total_days(),
            present_days,
            leave_days,
            amount_per_day,
            total_amount: Decimal::from(present_days) * amount_per_day,
            attendance: Vec::new(),
        }
    }

    /// 建構器模式：設置出席明細
    pub fn with_attendance(mut self, attendance: Vec<AttendanceDay>) -> Self {
        self.attendance = attendance;
        self
    }

    /// 缺席天數（推導值）
    pub fn absent_days(&self) -> u32 {
        self.total_days
            .saturating_sub(self.present_days)
            .saturating_sub(self.leave_days)
    }

    /// 帳單所屬週期
    pub fn period(&self) -> BillingPeriod {
        BillingPeriod {
            year: self.year,
            month: self.month,
        }
    }
}

/// 帳單歷史紀錄（結算時的帳單快照）
///
/// 費率與金額在建立時凍結，之後的費率調整不會回溯影響。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillLedgerEntry {
    /// 帳單ID
    pub bill_id: Uuid,

    /// 快照建立時間
    pub recorded_at: DateTime<Utc>,

    /// 帳單內容
    #[serde(flatten)]
    pub bill: MonthlyBill,
}

impl BillLedgerEntry {
    /// 創建新的帳單歷史紀錄
    pub fn new(bill: MonthlyBill) -> Self {
        Self {
            bill_id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            bill,
        }
    }

    pub fn resident_id(&self) -> &str {
        &self.bill.resident_id
    }

    pub fn period(&self) -> BillingPeriod {
        self.bill.period()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_2024() -> BillingPeriod {
        BillingPeriod::new(3, 2024).unwrap()
    }

    #[test]
    fn test_bill_amount() {
        let bill = MonthlyBill::new("S1".to_string(), march_2024(), 20, 3, Decimal::from(50));

        assert_eq!(bill.total_days, 31);
        assert_eq!(bill.total_amount, Decimal::from(1000));
        assert_eq!(bill.absent_days(), 8);
    }

    #[test]
    fn test_bill_amount_with_fractional_rate() {
        // 42.50 × 3 = 127.50，無浮點誤差
        let rate = Decimal::new(4250, 2);
        let bill = MonthlyBill::new("S1".to_string(), march_2024(), 3, 0, rate);

        assert_eq!(bill.total_amount, Decimal::new(12750, 2));
    }

    #[test]
    fn test_empty_bill() {
        let bill = MonthlyBill::new("S1".to_string(), march_2024(), 0, 0, Decimal::from(50));

        assert_eq!(bill.total_amount, Decimal::ZERO);
        assert_eq!(bill.absent_days(), 31);
        assert!(bill.attendance.is_empty());
    }

    #[test]
    fn test_ledger_entry_json_is_flat() {
        let bill = MonthlyBill::new("S1".to_string(), march_2024(), 1, 0, Decimal::from(50));
        let entry = BillLedgerEntry::new(bill);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["resident_id"], "S1");
        assert_eq!(json["month"], 3);
        assert_eq!(json["year"], 2024);
        assert_eq!(json["present_days"], 1);
        assert!(json["bill_id"].is_string());
        assert_eq!(entry.period(), march_2024());
    }
}

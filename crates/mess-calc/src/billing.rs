//! 月帳單計算器

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use mess_core::{
    AttendanceDay, BillingPeriod, DayStatus, MealRecord, MessError, MonthlyBill, Result,
};
use mess_store::{AttendanceStore, PeriodSnapshot, ResidentDirectory};
use rust_decimal::Decimal;

use crate::resolver::DayStatusResolver;

/// 週期出席統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayCounts {
    pub present: u32,
    pub absent: u32,
    pub leave: u32,
}

impl DayCounts {
    fn add(&mut self, status: DayStatus) {
        match status {
            DayStatus::Present => self.present += 1,
            DayStatus::Absent => self.absent += 1,
            DayStatus::Leave => self.leave += 1,
        }
    }
}

/// 月帳單計算器
///
/// 帳單一律由用餐紀錄即時推導，不快取。
pub struct BillCalculator {
    store: Arc<dyn AttendanceStore>,
    directory: Arc<dyn ResidentDirectory>,
}

impl BillCalculator {
    /// 創建新的帳單計算器
    pub fn new(store: Arc<dyn AttendanceStore>, directory: Arc<dyn ResidentDirectory>) -> Self {
        Self { store, directory }
    }

    /// 計算月帳單
    ///
    /// `amount_per_day` 由呼叫端傳入（取自呼叫當下的配置）。
    pub fn compute_bill(
        &self,
        resident_id: &str,
        period: BillingPeriod,
        amount_per_day: Decimal,
    ) -> Result<MonthlyBill> {
        mess_core::config::validate_rate(amount_per_day)?;
        self.ensure_resident(resident_id)?;

        tracing::debug!("Step 1: 讀取 {} {} 的出席快照", resident_id, period);
        let snapshot = self.store.period_snapshot(resident_id, period)?;

        tracing::debug!("Step 2: 逐日推導狀態（{} 天）", period.total_days());
        let counts = Self::count_days(period, &snapshot);

        tracing::debug!("Step 3: 組合出席明細");
        let attendance = Self::attendance_days(resident_id, &snapshot);

        let bill = MonthlyBill::new(
            resident_id.to_string(),
            period,
            counts.present,
            counts.leave,
            amount_per_day,
        )
        .with_attendance(attendance);

        tracing::info!(
            "帳單計算完成：{} {}，出席 {} 天，請假 {} 天，金額 {}",
            resident_id,
            period,
            bill.present_days,
            bill.leave_days,
            bill.total_amount
        );

        Ok(bill)
    }

    /// 某住宿生某週期的出席明細（含推導出的日狀態）
    pub fn attendance_for_period(
        &self,
        resident_id: &str,
        period: BillingPeriod,
    ) -> Result<Vec<AttendanceDay>> {
        self.ensure_resident(resident_id)?;
        let snapshot = self.store.period_snapshot(resident_id, period)?;
        Ok(Self::attendance_days(resident_id, &snapshot))
    }

    /// 某日所有住宿生的出席明細
    pub fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceDay>> {
        let records = self.store.records_on(date)?;
        let leaves = self.store.leaves_on(date)?;

        let on_leave: HashSet<&str> = leaves.iter().map(|l| l.resident_id.as_str()).collect();
        let mut by_resident: BTreeMap<&str, AttendanceDay> = BTreeMap::new();

        for record in &records {
            let status = DayStatusResolver::resolve_record(
                Some(record),
                on_leave.contains(record.resident_id.as_str()),
            );
            by_resident.insert(
                record.resident_id.as_str(),
                AttendanceDay::from_record(record, status),
            );
        }

        for leave in &leaves {
            by_resident
                .entry(leave.resident_id.as_str())
                .or_insert_with(|| leave_only_day(&leave.resident_id, date));
        }

        Ok(by_resident.into_values().collect())
    }

    /// 逐日統計週期狀態；沒有紀錄的日期視為缺席
    pub fn count_days(period: BillingPeriod, snapshot: &PeriodSnapshot) -> DayCounts {
        let records: BTreeMap<NaiveDate, &MealRecord> =
            snapshot.records.iter().map(|r| (r.date, r)).collect();
        let leaves: HashSet<NaiveDate> = snapshot.leaves.iter().map(|l| l.date).collect();

        let mut counts = DayCounts::default();
        for date in period.dates() {
            let status =
                DayStatusResolver::resolve_record(records.get(&date).copied(), leaves.contains(&date));
            counts.add(status);
        }
        counts
    }

    /// 合併用餐紀錄與請假紀錄為依日期排序的明細
    fn attendance_days(resident_id: &str, snapshot: &PeriodSnapshot) -> Vec<AttendanceDay> {
        let leaves: HashSet<NaiveDate> = snapshot.leaves.iter().map(|l| l.date).collect();
        let mut days: BTreeMap<NaiveDate, AttendanceDay> = snapshot
            .records
            .iter()
            .map(|record| {
                let status =
                    DayStatusResolver::resolve_record(Some(record), leaves.contains(&record.date));
                (record.date, AttendanceDay::from_record(record, status))
            })
            .collect();

        for date in leaves {
            days.entry(date)
                .or_insert_with(|| leave_only_day(resident_id, date));
        }

        days.into_values().collect()
    }

    fn ensure_resident(&self, resident_id: &str) -> Result<()> {
        match self.directory.get(resident_id)? {
            Some(_) => Ok(()),
            None => Err(MessError::ResidentNotFound(resident_id.to_string())),
        }
    }
}

/// 只有請假、沒有用餐紀錄的日期
fn leave_only_day(resident_id: &str, date: NaiveDate) -> AttendanceDay {
    let record = MealRecord::new(resident_id.to_string(), date);
    AttendanceDay::from_record(&record, DayStatus::Leave)
}

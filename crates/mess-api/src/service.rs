//! 伙食服務
//!
//! 組合儲存層、合併器、計算器與帳單歷史，並持有執行期的每日費率。
//! HTTP 處理函數只做編解碼，所有驗證都在這裡完成。

use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use mess_calc::{AttendanceReconciler, BillCalculator, BulkUpdate, PeriodFinalizer};
use mess_core::config::validate_rate;
use mess_core::{
    parse_date, AttendanceDay, BillLedgerEntry, BillingPeriod, LeaveRecord, MessConfig, MessError, MonthlyBill, Result,
};
use mess_store::{AttendanceStore, BillLedger, InMemoryAttendanceStore, ResidentDirectory};
use rust_decimal::Decimal;

use crate::api_types::{BulkUpdateRequest, LeaveRequest};

/// 單次請假的最長天數
pub const MAX_LEAVE_DAYS: i64 = 366;

/// 伙食服務
pub struct MessService {
    store: Arc<dyn AttendanceStore>,
    directory: Arc<dyn ResidentDirectory>,
    ledger: Arc<BillLedger>,
    reconciler: AttendanceReconciler,
    calculator: Arc<BillCalculator>,
    finalizer: PeriodFinalizer,
    amount_per_day: RwLock<Decimal>,
}

impl MessService {
    /// 創建新的服務
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        directory: Arc<dyn ResidentDirectory>,
        ledger: Arc<BillLedger>,
        config: &MessConfig,
    ) -> Result<Self> {
        config.validate()?;

        let calculator = Arc::new(BillCalculator::new(store.clone(), directory.clone()));
        Ok(Self {
            reconciler: AttendanceReconciler::new(store.clone(), directory.clone()),
            finalizer: PeriodFinalizer::new(calculator.clone(), directory.clone(), ledger.clone()),
            calculator,
            store,
            directory,
            ledger,
            amount_per_day: RwLock::new(config.amount_per_day),
        })
    }

    /// 以記憶體儲存層創建服務
    pub fn in_memory(directory: Arc<dyn ResidentDirectory>, config: &MessConfig) -> Result<Self> {
        Self::new(
            Arc::new(InMemoryAttendanceStore::new()),
            directory,
            Arc::new(BillLedger::new()),
            config,
        )
    }

    /// GET /attendance/{date}
    pub fn attendance_on(&self, date: &str) -> Result<Vec<AttendanceDay>> {
        self.calculator.attendance_on(parse_date(date)?)
    }

    /// POST /attendance/bulk-update，回傳寫入的住宿生數
    pub fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<usize> {
        let update = BulkUpdate::parse(
            &request.date,
            &request.meal_type,
            request
                .updates
                .iter()
                .map(|u| (u.resident_id.as_str(), u.status.as_str())),
        )?;
        Ok(self.reconciler.reconcile(&update)?.touched)
    }

    /// GET /resident/{id}/attendance
    pub fn resident_attendance(
        &self,
        resident_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<AttendanceDay>> {
        let period = BillingPeriod::new(month, year)?;
        self.calculator.attendance_for_period(resident_id, period)
    }

    /// GET /resident/{id}/bill（以目前費率即時計算）
    pub fn bill(&self, resident_id: &str, month: u32, year: i32) -> Result<MonthlyBill> {
        let period = BillingPeriod::new(month, year)?;
        let rate = self.amount_per_day()?;
        self.calculator.compute_bill(resident_id, period, rate)
    }

    /// GET /resident/{id}/bill-history
    pub fn bill_history(&self, resident_id: &str) -> Result<Vec<BillLedgerEntry>> {
        self.ensure_resident(resident_id)?;
        self.ledger.history(resident_id)
    }

    /// POST /resident/{id}/leave，回傳登記的請假天數
    pub fn grant_leave(&self, resident_id: &str, request: &LeaveRequest) -> Result<usize> {
        self.ensure_resident(resident_id)?;

        let start = parse_date(&request.start_date)?;
        let end = match &request.end_date {
            Some(raw) => parse_date(raw)?,
            None => start,
        };
        let leaves = leave_range(resident_id, start, end, request.reason.as_deref())?;

        let granted = self.store.grant_leave(leaves)?;
        tracing::info!("住宿生 {} 請假 {} ~ {}，共 {} 天", resident_id, start, end, granted);
        Ok(granted)
    }

    /// DELETE /resident/{id}/leave/{date}，回傳是否有請假紀錄被取消
    pub fn revoke_leave(&self, resident_id: &str, date: &str) -> Result<bool> {
        self.ensure_resident(resident_id)?;
        let date = parse_date(date)?;
        self.store.revoke_leave(resident_id, date)
    }

    /// POST /billing/finalize
    pub fn finalize_period(
        &self,
        month: u32,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<Vec<BillLedgerEntry>> {
        let period = BillingPeriod::new(month, year)?;
        let rate = self.amount_per_day()?;
        Ok(self.finalizer.finalize(period, as_of, rate)?.entries)
    }

    /// 目前的每日費率
    pub fn amount_per_day(&self) -> Result<Decimal> {
        self.amount_per_day
            .read()
            .map(|rate| *rate)
            .map_err(|_| MessError::StorageUnavailable("billing rate lock poisoned".to_string()))
    }

    /// 調整每日費率（只影響之後計算的帳單）
    pub fn set_amount_per_day(&self, amount: Decimal) -> Result<Decimal> {
        validate_rate(amount)?;
        let mut rate = self
            .amount_per_day
            .write()
            .map_err(|_| MessError::StorageUnavailable("billing rate lock poisoned".to_string()))?;

        tracing::info!("每日費率調整：{} -> {}", *rate, amount);
        *rate = amount;
        Ok(amount)
    }

    fn ensure_resident(&self, resident_id: &str) -> Result<()> {
        match self.directory.get(resident_id)? {
            Some(_) => Ok(()),
            None => Err(MessError::ResidentNotFound(resident_id.to_string())),
        }
    }
}

/// 展開請假區間（含首尾）
fn leave_range(
    resident_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    reason: Option<&str>,
) -> Result<Vec<LeaveRecord>> {
    BillingPeriod::containing(start)?;
    BillingPeriod::containing(end)?;
    if end < start {
        return Err(MessError::Validation(format!(
            "end_date {} is before start_date {}",
            end, start
        )));
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_LEAVE_DAYS {
        return Err(MessError::Validation(format!(
            "leave of {} days exceeds the limit of {}",
            days, MAX_LEAVE_DAYS
        )));
    }

    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let leave = LeaveRecord::new(resident_id.to_string(), date);
            match reason {
                Some(r) => leave.with_reason(r.to_string()),
                None => leave,
            }
        })
        .collect())
}

//! 週期結算

use std::sync::Arc;

use chrono::NaiveDate;
use mess_core::{BillLedgerEntry, BillingPeriod, MessError, Result};
use mess_store::{BillLedger, ResidentDirectory};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::billing::BillCalculator;

/// 結算結果
#[derive(Debug, Clone)]
pub struct FinalizeResult {
    /// 結算週期
    pub period: BillingPeriod,

    /// 寫入帳單歷史的快照
    pub entries: Vec<BillLedgerEntry>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl FinalizeResult {
    /// 週期總金額
    pub fn total_amount(&self) -> Decimal {
        self.entries.iter().map(|e| e.bill.total_amount).sum()
    }
}

/// 週期結算器
///
/// 對已結束的週期為名冊中每位住宿生（含已退宿者）計算帳單，
/// 並以當時的每日費率寫入帳單歷史。
pub struct PeriodFinalizer {
    calculator: Arc<BillCalculator>,
    directory: Arc<dyn ResidentDirectory>,
    ledger: Arc<BillLedger>,
}

impl PeriodFinalizer {
    /// 創建新的結算器
    pub fn new(
        calculator: Arc<BillCalculator>,
        directory: Arc<dyn ResidentDirectory>,
        ledger: Arc<BillLedger>,
    ) -> Self {
        Self {
            calculator,
            directory,
            ledger,
        }
    }

    /// 結算週期
    pub fn finalize(
        &self,
        period: BillingPeriod,
        as_of: NaiveDate,
        amount_per_day: Decimal,
    ) -> Result<FinalizeResult> {
        if !period.has_ended_before(as_of) {
            return Err(MessError::Validation(format!(
                "period {} has not ended as of {}",
                period, as_of
            )));
        }

        let residents = self.directory.list()?;
        tracing::info!("開始結算 {}：住宿生 {} 位，每日費率 {}", period, residents.len(), amount_per_day);

        let start_time = std::time::Instant::now();

        let bills = residents
            .par_iter()
            .map(|resident| {
                self.calculator
                    .compute_bill(&resident.resident_id, period, amount_per_day)
            })
            .collect::<Result<Vec<_>>>()?;

        let entries = self.ledger.record_all(bills)?;

        let result = FinalizeResult {
            period,
            entries,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!(
            "結算完成 {}：帳單 {} 筆，總金額 {}",
            period,
            result.entries.len(),
            result.total_amount()
        );

        Ok(result)
    }
}

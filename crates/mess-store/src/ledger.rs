//! 帳單歷史
//!
//! 每位住宿生每個週期至多一筆；重複結算會取代舊的快照，
//! 沿用原帳單ID並更新快照時間。對外一律回傳複本。

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;
use mess_core::{BillLedgerEntry, BillingPeriod, MonthlyBill, Result};

use crate::{read_guard, write_guard};

/// 帳單歷史
#[derive(Debug, Default)]
pub struct BillLedger {
    entries: RwLock<BTreeMap<(String, BillingPeriod), BillLedgerEntry>>,
}

impl BillLedger {
    /// 創建空的帳單歷史
    pub fn new() -> Self {
        Self::default()
    }

    /// 記錄帳單快照
    ///
    /// 整批在同一把寫鎖下寫入，不會只寫入一部分。
    pub fn record_all(&self, bills: Vec<MonthlyBill>) -> Result<Vec<BillLedgerEntry>> {
        let mut entries = write_guard(&self.entries, "ledger")?;
        Ok(bills
            .into_iter()
            .map(|bill| Self::upsert(&mut entries, bill))
            .collect())
    }

    fn upsert(
        entries: &mut BTreeMap<(String, BillingPeriod), BillLedgerEntry>,
        bill: MonthlyBill,
    ) -> BillLedgerEntry {
        let key = (bill.resident_id.clone(), bill.period());
        let entry = match entries.get(&key) {
            Some(existing) => {
                tracing::debug!("取代帳單快照 {} {}", key.0, key.1);
                BillLedgerEntry {
                    bill_id: existing.bill_id,
                    recorded_at: Utc::now(),
                    bill,
                }
            }
            None => BillLedgerEntry::new(bill),
        };

        entries.insert(key, entry.clone());
        entry
    }

    /// 某住宿生的帳單歷史（最新週期在前）
    pub fn history(&self, resident_id: &str) -> Result<Vec<BillLedgerEntry>> {
        let entries = read_guard(&self.entries, "ledger")?;
        Ok(entries
            .iter()
            .filter(|((id, _), _)| id == resident_id)
            .rev()
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    /// 帳單快照總數
    pub fn len(&self) -> Result<usize> {
        Ok(read_guard(&self.entries, "ledger")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn bill(resident: &str, month: u32, year: i32, present: u32, rate: i64) -> MonthlyBill {
        MonthlyBill::new(
            resident.to_string(),
            BillingPeriod::new(month, year).unwrap(),
            present,
            0,
            Decimal::from(rate),
        )
    }

    #[test]
    fn test_history_newest_first() {
        let ledger = BillLedger::new();
        ledger
            .record_all(vec![
                bill("S1", 11, 2023, 10, 50),
                bill("S1", 2, 2024, 12, 50),
                bill("S1", 12, 2023, 11, 50),
                bill("S2", 3, 2024, 5, 50),
            ])
            .unwrap();

        let periods: Vec<_> = ledger
            .history("S1")
            .unwrap()
            .iter()
            .map(|e| e.period().to_string())
            .collect();
        assert_eq!(periods, vec!["2024-02", "2023-12", "2023-11"]);
    }

    #[test]
    fn test_record_twice_replaces_entry() {
        let ledger = BillLedger::new();
        let first = ledger.record_all(vec![bill("S1", 3, 2024, 1, 50)]).unwrap().remove(0);
        let second = ledger.record_all(vec![bill("S1", 3, 2024, 1, 80)]).unwrap().remove(0);

        assert_eq!(ledger.len().unwrap(), 1);
        assert_eq!(second.bill_id, first.bill_id);
        assert_eq!(second.bill.total_amount, Decimal::from(80));

        // 先前取得的複本不受影響
        assert_eq!(first.bill.total_amount, Decimal::from(50));
    }

    #[test]
    fn test_unknown_resident_has_empty_history() {
        let ledger = BillLedger::new();
        assert!(ledger.history("S9").unwrap().is_empty());
        assert!(ledger.is_empty().unwrap());
    }

    #[test]
    fn test_record_all_writes_every_bill() {
        let ledger = BillLedger::new();
        let first = ledger.record_all(vec![bill("S1", 3, 2024, 4, 50)]).unwrap().remove(0);

        let entries = ledger
            .record_all(vec![bill("S1", 3, 2024, 5, 50), bill("S2", 3, 2024, 2, 50)])
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].bill_id, first.bill_id);
        assert_eq!(entries[0].bill.present_days, 5);
        assert_eq!(ledger.len().unwrap(), 2);
        assert_eq!(ledger.history("S2").unwrap()[0].bill.present_days, 2);
    }
}

//! 用餐紀錄儲存（含請假覆蓋層）

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use chrono::NaiveDate;
use mess_core::{BillingPeriod, LeaveRecord, MealMark, MealRecord, MealType, Result};

use crate::{read_guard, write_guard};

/// 單一餐別寫入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWrite {
    /// 住宿生ID
    pub resident_id: String,

    /// 出席標記
    pub mark: MealMark,
}

impl SlotWrite {
    pub fn new(resident_id: String, mark: MealMark) -> Self {
        Self { resident_id, mark }
    }
}

/// 某住宿生某週期的一致性快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodSnapshot {
    /// 週期內已存在的用餐紀錄（依日期排序）
    pub records: Vec<MealRecord>,

    /// 週期內的請假紀錄（依日期排序）
    pub leaves: Vec<LeaveRecord>,
}

/// 出席儲存介面
///
/// 同一批次的餐別寫入必須以原子方式套用，讀取端不會看到只寫了一半的三餐。
pub trait AttendanceStore: Send + Sync {
    /// 以 upsert 語意寫入某日某餐的一批標記，回傳寫入的不重複住宿生數
    ///
    /// 同一批次內重複出現的住宿生以最後一筆為準。
    fn upsert_slots(&self, date: NaiveDate, meal: MealType, writes: &[SlotWrite]) -> Result<usize>;

    /// 讀取單筆用餐紀錄
    fn record(&self, resident_id: &str, date: NaiveDate) -> Result<Option<MealRecord>>;

    /// 某日所有住宿生的用餐紀錄
    fn records_on(&self, date: NaiveDate) -> Result<Vec<MealRecord>>;

    /// 某日所有請假紀錄
    fn leaves_on(&self, date: NaiveDate) -> Result<Vec<LeaveRecord>>;

    /// 某住宿生某週期的快照（單一讀鎖下取得）
    fn period_snapshot(&self, resident_id: &str, period: BillingPeriod) -> Result<PeriodSnapshot>;

    /// 新增或覆寫請假紀錄，回傳寫入筆數
    fn grant_leave(&self, leaves: Vec<LeaveRecord>) -> Result<usize>;

    /// 撤銷請假紀錄，回傳是否存在
    fn revoke_leave(&self, resident_id: &str, date: NaiveDate) -> Result<bool>;
}

type DayKey = (String, NaiveDate);

#[derive(Debug, Default)]
struct Tables {
    meals: BTreeMap<DayKey, MealRecord>,
    leaves: BTreeMap<DayKey, LeaveRecord>,
}

/// 記憶體內出席儲存
///
/// 以 (住宿生ID, 日期) 為鍵，第一次寫入時才建立紀錄。
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    tables: RwLock<Tables>,
}

impl InMemoryAttendanceStore {
    /// 創建空的儲存
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存在的用餐紀錄數
    pub fn record_count(&self) -> Result<usize> {
        Ok(read_guard(&self.tables, "attendance")?.meals.len())
    }

    /// 所有用餐紀錄（依住宿生、日期排序）
    pub fn all_records(&self) -> Result<Vec<MealRecord>> {
        Ok(read_guard(&self.tables, "attendance")?
            .meals
            .values()
            .cloned()
            .collect())
    }
}

fn period_range(resident_id: &str, period: BillingPeriod) -> std::ops::RangeInclusive<DayKey> {
    (resident_id.to_string(), period.first_day())..=(resident_id.to_string(), period.last_day())
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn upsert_slots(&self, date: NaiveDate, meal: MealType, writes: &[SlotWrite]) -> Result<usize> {
        if writes.is_empty() {
            return Ok(0);
        }

        let mut tables = write_guard(&self.tables, "attendance")?;
        let mut touched: HashSet<&str> = HashSet::new();
        let mut created = 0usize;

        for write in writes {
            let record = tables
                .meals
                .entry((write.resident_id.clone(), date))
                .or_insert_with(|| {
                    created += 1;
                    MealRecord::new(write.resident_id.clone(), date)
                });
            record.set_mark(meal, write.mark);
            touched.insert(write.resident_id.as_str());
        }

        tracing::debug!(
            "寫入 {} {}：{} 位住宿生，新建紀錄 {} 筆",
            date,
            meal,
            touched.len(),
            created
        );

        Ok(touched.len())
    }

    fn record(&self, resident_id: &str, date: NaiveDate) -> Result<Option<MealRecord>> {
        let tables = read_guard(&self.tables, "attendance")?;
        Ok(tables.meals.get(&(resident_id.to_string(), date)).cloned())
    }

    fn records_on(&self, date: NaiveDate) -> Result<Vec<MealRecord>> {
        let tables = read_guard(&self.tables, "attendance")?;
        Ok(tables
            .meals
            .values()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    fn leaves_on(&self, date: NaiveDate) -> Result<Vec<LeaveRecord>> {
        let tables = read_guard(&self.tables, "attendance")?;
        Ok(tables
            .leaves
            .values()
            .filter(|l| l.date == date)
            .cloned()
            .collect())
    }

    fn period_snapshot(&self, resident_id: &str, period: BillingPeriod) -> Result<PeriodSnapshot> {
        let tables = read_guard(&self.tables, "attendance")?;
        let range = period_range(resident_id, period);

        Ok(PeriodSnapshot {
            records: tables.meals.range(range.clone()).map(|(_, r)| r.clone()).collect(),
            leaves: tables.leaves.range(range).map(|(_, l)| l.clone()).collect(),
        })
    }

    fn grant_leave(&self, leaves: Vec<LeaveRecord>) -> Result<usize> {
        let mut tables = write_guard(&self.tables, "attendance")?;
        let count = leaves.len();

        for leave in leaves {
            tables
                .leaves
                .insert((leave.resident_id.clone(), leave.date), leave);
        }

        Ok(count)
    }

    fn revoke_leave(&self, resident_id: &str, date: NaiveDate) -> Result<bool> {
        let mut tables = write_guard(&self.tables, "attendance")?;
        Ok(tables
            .leaves
            .remove(&(resident_id.to_string(), date))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn present(id: &str) -> SlotWrite {
        SlotWrite::new(id.to_string(), MealMark::Present)
    }

    #[test]
    fn test_first_write_creates_record() {
        let store = InMemoryAttendanceStore::new();
        assert!(store.record("S1", day(1)).unwrap().is_none());

        let touched = store
            .upsert_slots(day(1), MealType::Breakfast, &[present("S1")])
            .unwrap();
        assert_eq!(touched, 1);

        let record = store.record("S1", day(1)).unwrap().unwrap();
        assert_eq!(record.breakfast, MealMark::Present);
        assert_eq!(record.lunch, MealMark::Absent);
        assert_eq!(record.dinner, MealMark::Absent);
    }

    #[test]
    fn test_write_only_touches_named_slot() {
        let store = InMemoryAttendanceStore::new();
        store
            .upsert_slots(day(1), MealType::Breakfast, &[present("S1")])
            .unwrap();
        store
            .upsert_slots(day(1), MealType::Dinner, &[present("S1")])
            .unwrap();

        let record = store.record("S1", day(1)).unwrap().unwrap();
        assert_eq!(
            record.marks(),
            [MealMark::Present, MealMark::Absent, MealMark::Present]
        );
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_resident_in_batch_last_wins() {
        let store = InMemoryAttendanceStore::new();
        let writes = vec![
            present("S1"),
            SlotWrite::new("S1".to_string(), MealMark::Absent),
        ];

        let touched = store.upsert_slots(day(2), MealType::Lunch, &writes).unwrap();
        assert_eq!(touched, 1);
        assert_eq!(
            store.record("S1", day(2)).unwrap().unwrap().lunch,
            MealMark::Absent
        );
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let store = InMemoryAttendanceStore::new();
        assert_eq!(store.upsert_slots(day(1), MealType::Lunch, &[]).unwrap(), 0);
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn test_records_on_date() {
        let store = InMemoryAttendanceStore::new();
        store
            .upsert_slots(day(1), MealType::Lunch, &[present("S1"), present("S2")])
            .unwrap();
        store
            .upsert_slots(day(2), MealType::Lunch, &[present("S1")])
            .unwrap();

        assert_eq!(store.records_on(day(1)).unwrap().len(), 2);
        assert_eq!(store.records_on(day(2)).unwrap().len(), 1);
        assert!(store.records_on(day(3)).unwrap().is_empty());
    }

    #[test]
    fn test_period_snapshot_is_scoped() {
        let store = InMemoryAttendanceStore::new();
        let feb_29 = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let apr_1 = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();

        for date in [feb_29, day(1), day(31), apr_1] {
            store
                .upsert_slots(date, MealType::Dinner, &[present("S1"), present("S2")])
                .unwrap();
        }
        store
            .grant_leave(vec![
                LeaveRecord::new("S1".to_string(), day(10)),
                LeaveRecord::new("S2".to_string(), day(11)),
            ])
            .unwrap();

        let march = BillingPeriod::new(3, 2024).unwrap();
        let snapshot = store.period_snapshot("S1", march).unwrap();

        let dates: Vec<_> = snapshot.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(31)]);
        assert!(snapshot.records.iter().all(|r| r.resident_id == "S1"));
        assert_eq!(snapshot.leaves.len(), 1);
        assert_eq!(snapshot.leaves[0].date, day(10));
    }

    #[test]
    fn test_concurrent_meal_writes_keep_every_slot() {
        let store = InMemoryAttendanceStore::new();
        let residents: Vec<SlotWrite> = (1..=20).map(|i| present(&format!("S{}", i))).collect();

        std::thread::scope(|scope| {
            // 三個執行緒各寫一種餐別，同一住宿生同一天
            for meal in MealType::ALL {
                let store = &store;
                let residents = &residents;
                scope.spawn(move || {
                    for d in 1..=10 {
                        store.upsert_slots(day(d), meal, residents).unwrap();
                    }
                });
            }

            // 兩個執行緒反覆寫同一格
            for mark in [MealMark::Present, MealMark::Absent] {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..200 {
                        store
                            .upsert_slots(day(1), MealType::Lunch, &[SlotWrite::new("S0".to_string(), mark)])
                            .unwrap();
                    }
                });
            }
        });

        for d in 1..=10 {
            let records = store.records_on(day(d)).unwrap();
            for record in records.iter().filter(|r| r.resident_id != "S0") {
                assert_eq!(record.marks(), [MealMark::Present; 3], "{} {}", record.resident_id, d);
            }
        }

        let contested = store.record("S0", day(1)).unwrap().unwrap();
        assert_eq!(contested.breakfast, MealMark::Absent);
        assert_eq!(contested.dinner, MealMark::Absent);
        assert_eq!(store.record_count().unwrap(), 20 * 10 + 1);
    }

    #[test]
    fn test_grant_and_revoke_leave() {
        let store = InMemoryAttendanceStore::new();
        store
            .grant_leave(vec![LeaveRecord::new("S1".to_string(), day(5))])
            .unwrap();

        assert_eq!(store.leaves_on(day(5)).unwrap().len(), 1);
        assert!(store.revoke_leave("S1", day(5)).unwrap());
        assert!(!store.revoke_leave("S1", day(5)).unwrap());
        assert!(store.leaves_on(day(5)).unwrap().is_empty());
    }
}

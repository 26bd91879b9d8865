//! 批次出席合併

use std::sync::Arc;

use chrono::NaiveDate;
use mess_core::{parse_date, BillingPeriod, MealMark, MealType, Result};
use mess_store::{AttendanceStore, ResidentDirectory, SlotWrite};

/// 批次出席更新（某日某餐）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUpdate {
    /// 日期
    pub date: NaiveDate,

    /// 餐別
    pub meal: MealType,

    /// 住宿生標記
    pub updates: Vec<SlotWrite>,
}

impl BulkUpdate {
    /// 創建新的批次更新
    pub fn new(date: NaiveDate, meal: MealType) -> Self {
        Self {
            date,
            meal,
            updates: Vec::new(),
        }
    }

    /// 建構器模式：加入一筆標記
    pub fn with_update(mut self, resident_id: &str, mark: MealMark) -> Self {
        self.updates.push(SlotWrite::new(resident_id.to_string(), mark));
        self
    }

    /// 由原始字串解析；任何欄位不合法時整批拒絕
    pub fn parse<I, S, T>(date: &str, meal: &str, updates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let date = parse_date(date)?;
        // 只接受可計費年份內的日期，否則寫入後無法查詢
        BillingPeriod::containing(date)?;
        let meal: MealType = meal.parse()?;
        let updates = updates
            .into_iter()
            .map(|(id, status)| -> Result<SlotWrite> {
                Ok(SlotWrite::new(id.into(), status.as_ref().parse()?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            date,
            meal,
            updates,
        })
    }
}

/// 合併結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// 寫入的住宿生數
    pub touched: usize,

    /// 略過的住宿生（已退宿或不在名冊中）
    pub skipped: Vec<String>,
}

/// 批次出席合併器
///
/// 只寫入傳入的住宿生，未列出的住宿生維持原狀。同樣的批次重複套用
/// 結果不變（每個餐別以最後一次寫入為準）。不會重算帳單。
pub struct AttendanceReconciler {
    store: Arc<dyn AttendanceStore>,
    directory: Arc<dyn ResidentDirectory>,
}

impl AttendanceReconciler {
    /// 創建新的合併器
    pub fn new(store: Arc<dyn AttendanceStore>, directory: Arc<dyn ResidentDirectory>) -> Self {
        Self { store, directory }
    }

    /// 套用批次更新
    pub fn reconcile(&self, update: &BulkUpdate) -> Result<ReconcileOutcome> {
        if update.updates.is_empty() {
            tracing::debug!("{} {} 沒有任何更新，略過", update.date, update.meal);
            return Ok(ReconcileOutcome::default());
        }

        let mut writes = Vec::with_capacity(update.updates.len());
        let mut skipped = Vec::new();

        for write in &update.updates {
            match self.directory.get(&write.resident_id)? {
                Some(resident) if resident.is_active() => writes.push(write.clone()),
                Some(_) => {
                    tracing::debug!("住宿生 {} 已退宿，略過", write.resident_id);
                    skipped.push(write.resident_id.clone());
                }
                None => {
                    tracing::warn!("住宿生 {} 不在名冊中，略過", write.resident_id);
                    skipped.push(write.resident_id.clone());
                }
            }
        }

        let touched = self.store.upsert_slots(update.date, update.meal, &writes)?;

        tracing::info!(
            "出席合併完成：{} {}，寫入 {} 位，略過 {} 位",
            update.date,
            update.meal,
            touched,
            skipped.len()
        );

        Ok(ReconcileOutcome { touched, skipped })
    }
}

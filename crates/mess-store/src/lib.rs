//! # Mess Store
//!
//! 出席紀錄、請假紀錄、住宿生名冊與帳單歷史的儲存層
//!
//! 所有儲存體都以讀寫鎖保護；鎖中毒時回報 `StorageUnavailable`。

pub mod attendance;
pub mod directory;
pub mod ledger;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use mess_core::{MessError, Result};

// Re-export 主要類型
pub use attendance::{AttendanceStore, InMemoryAttendanceStore, PeriodSnapshot, SlotWrite};
pub use directory::{InMemoryDirectory, ResidentDirectory};
pub use ledger::BillLedger;

/// 取得讀鎖
pub(crate) fn read_guard<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| MessError::StorageUnavailable(format!("{} 讀鎖已中毒", what)))
}

/// 取得寫鎖
pub(crate) fn write_guard<'a, T>(
    lock: &'a RwLock<T>,
    what: &str,
) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| MessError::StorageUnavailable(format!("{} 寫鎖已中毒", what)))
}

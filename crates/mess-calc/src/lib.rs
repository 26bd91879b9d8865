//! # Mess Billing Engine
//!
//! 出席合併、日狀態推導與月帳單計算

pub mod billing;
pub mod finalize;
pub mod reconciler;
pub mod resolver;

// Re-export 主要類型
pub use billing::{BillCalculator, DayCounts};
pub use finalize::{FinalizeResult, PeriodFinalizer};
pub use reconciler::{AttendanceReconciler, BulkUpdate, ReconcileOutcome};
pub use resolver::DayStatusResolver;

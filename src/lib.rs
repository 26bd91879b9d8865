//! # Mess
//!
//! 宿舍伙食出席統計與月帳單引擎
//!
//! - [`model`]：資料模型、日期週期、配置與錯誤類型
//! - [`store`]：出席/請假紀錄、住宿生名冊、帳單歷史
//! - [`calc`]：日狀態推導、批次出席合併、帳單計算與週期結算
//! - [`api`]：HTTP 路由、客戶端與重試策略

pub use mess_api as api;
pub use mess_calc as calc;
pub use mess_core as model;
pub use mess_store as store;

pub use mess_calc::{AttendanceReconciler, BillCalculator, BulkUpdate, DayStatusResolver, PeriodFinalizer};
pub use mess_core::{MessConfig, MessError, Result};

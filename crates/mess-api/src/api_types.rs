//! HTTP 請求與回應類型
//!
//! 只做 JSON 編解碼，不含業務邏輯。欄位值（日期、餐別、狀態）
//! 以原始字串接收，由服務層統一驗證。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一住宿生的標記
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    pub resident_id: String,
    /// "present" | "absent"
    pub status: String,
}

/// POST /attendance/bulk-update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    /// YYYY-MM-DD
    pub date: String,
    /// "breakfast" | "lunch" | "dinner"
    pub meal_type: String,
    #[serde(default)]
    pub updates: Vec<AttendanceUpdate>,
}

/// 寫入類操作的通用回應
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touched: Option<usize>,
}

impl ApiResponse {
    pub fn ok(touched: usize) -> Self {
        Self {
            success: true,
            error: None,
            touched: Some(touched),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            touched: None,
        }
    }
}

/// ?month=&year=
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub month: u32,
    pub year: i32,
}

/// POST /resident/{id}/leave
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub start_date: String,
    /// 未指定時只請 start_date 一天
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// POST /billing/finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub month: u32,
    pub year: i32,
}

/// GET/PUT /config/billing-rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRate {
    pub amount_per_day: Decimal,
}

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_omits_empty_fields() {
        let ok = serde_json::to_value(ApiResponse::ok(2)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "touched": 2}));

        let err = serde_json::to_value(ApiResponse::error("bad date".to_string())).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "bad date"}));
    }

    #[test]
    fn test_bulk_update_request_defaults_updates() {
        let req: BulkUpdateRequest =
            serde_json::from_str(r#"{"date":"2024-03-01","meal_type":"lunch"}"#).unwrap();
        assert!(req.updates.is_empty());
    }

    #[test]
    fn test_billing_rate_accepts_number_or_string() {
        let from_number: BillingRate = serde_json::from_str(r#"{"amount_per_day": 42.5}"#).unwrap();
        let from_string: BillingRate =
            serde_json::from_str(r#"{"amount_per_day": "42.5"}"#).unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.amount_per_day, Decimal::new(425, 1));
    }
}

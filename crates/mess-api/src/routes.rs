//! Axum 路由與 HTTP 處理函數
//!
//! `build_router` 是唯一入口；中介層（追蹤）由 `main.rs` 掛上，
//! 測試可直接使用未加中介層的路由。

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use mess_core::MessError;

use crate::api_types::{
    ApiResponse, BillingRate, BulkUpdateRequest, FinalizeRequest, HealthResponse, LeaveRequest,
    PeriodQuery,
};
use crate::service::MessService;

/// 服務名稱（/health 回報）
pub const SERVICE_NAME: &str = "mess-server";

/// 建立完整路由
pub fn build_router(service: Arc<MessService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/attendance/bulk-update", post(bulk_update))
        .route("/attendance/:date", get(attendance_on))
        .route("/resident/:id/attendance", get(resident_attendance))
        .route("/resident/:id/bill", get(resident_bill))
        .route("/resident/:id/bill-history", get(bill_history))
        .route("/resident/:id/leave", post(grant_leave))
        .route("/resident/:id/leave/:date", delete(revoke_leave))
        .route("/billing/finalize", post(finalize_period))
        .route("/config/billing-rate", get(get_rate).put(set_rate))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// 錯誤對應
// ---------------------------------------------------------------------------

/// HTTP 錯誤回應：`{success: false, error}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
}

impl From<MessError> for ApiError {
    fn from(err: MessError) -> Self {
        let status = match &err {
            MessError::Validation(_) | MessError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            MessError::ResidentNotFound(_) => StatusCode::NOT_FOUND,
            MessError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MessError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("請求失敗: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::error(self.message))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ---------------------------------------------------------------------------
// 出席
// ---------------------------------------------------------------------------

pub(crate) async fn attendance_on(
    State(svc): State<Arc<MessService>>,
    Path(date): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(svc.attendance_on(&date)?))
}

pub(crate) async fn bulk_update(
    State(svc): State<Arc<MessService>>,
    body: Result<Json<BulkUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse>> {
    let Json(request) = body?;
    let touched = svc.bulk_update(&request)?;
    Ok(Json(ApiResponse::ok(touched)))
}

// ---------------------------------------------------------------------------
// 住宿生
// ---------------------------------------------------------------------------

pub(crate) async fn resident_attendance(
    State(svc): State<Arc<MessService>>,
    Path(id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(q) = query?;
    Ok(Json(svc.resident_attendance(&id, q.month, q.year)?))
}

pub(crate) async fn resident_bill(
    State(svc): State<Arc<MessService>>,
    Path(id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(q) = query?;
    Ok(Json(svc.bill(&id, q.month, q.year)?))
}

pub(crate) async fn bill_history(
    State(svc): State<Arc<MessService>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(svc.bill_history(&id)?))
}

pub(crate) async fn grant_leave(
    State(svc): State<Arc<MessService>>,
    Path(id): Path<String>,
    body: Result<Json<LeaveRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse>> {
    let Json(request) = body?;
    let granted = svc.grant_leave(&id, &request)?;
    Ok(Json(ApiResponse::ok(granted)))
}

pub(crate) async fn revoke_leave(
    State(svc): State<Arc<MessService>>,
    Path((id, date)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse>> {
    let removed = svc.revoke_leave(&id, &date)?;
    Ok(Json(ApiResponse::ok(usize::from(removed))))
}

// ---------------------------------------------------------------------------
// 結算與費率
// ---------------------------------------------------------------------------

pub(crate) async fn finalize_period(
    State(svc): State<Arc<MessService>>,
    body: Result<Json<FinalizeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    let as_of = Utc::now().date_naive();
    Ok(Json(svc.finalize_period(request.month, request.year, as_of)?))
}

pub(crate) async fn get_rate(State(svc): State<Arc<MessService>>) -> ApiResult<Json<BillingRate>> {
    Ok(Json(BillingRate {
        amount_per_day: svc.amount_per_day()?,
    }))
}

pub(crate) async fn set_rate(
    State(svc): State<Arc<MessService>>,
    body: Result<Json<BillingRate>, JsonRejection>,
) -> ApiResult<Json<BillingRate>> {
    let Json(request) = body?;
    Ok(Json(BillingRate {
        amount_per_day: svc.set_amount_per_day(request.amount_per_day)?,
    }))
}

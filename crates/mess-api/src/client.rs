//! HTTP 客戶端
//!
//! 連線層失敗與 503 依 `RetryPolicy` 重試；其他 HTTP 錯誤立即回傳。

use mess_core::{AttendanceDay, BillLedgerEntry, MonthlyBill};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api_types::{
    ApiResponse, BillingRate, BulkUpdateRequest, FinalizeRequest, HealthResponse, LeaveRequest,
};
use crate::retry::{RetryPolicy, Retryable};

/// 客戶端錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("無法連線到伙食服務，請稍後再試: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("伙食服務回應 {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("無法解析回應: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("無效的服務位址: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP 狀態碼（僅限伺服器回應的錯誤）
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Retryable for ClientError {
    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Api { status, .. } => *status == StatusCode::SERVICE_UNAVAILABLE,
            ClientError::Decode(_) | ClientError::InvalidUrl(_) => false,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// 伙食服務客戶端
#[derive(Debug, Clone)]
pub struct MessClient {
    base_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl MessClient {
    /// 創建新的客戶端（預設重試策略）
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// 建構器模式：設置重試策略
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let url = self.endpoint(&["health"], None)?;
        self.send(Method::GET, url, None::<&()>).await
    }

    pub async fn attendance_on(&self, date: &str) -> ClientResult<Vec<AttendanceDay>> {
        let url = self.endpoint(&["attendance", date], None)?;
        self.send(Method::GET, url, None::<&()>).await
    }

    pub async fn bulk_update(&self, request: &BulkUpdateRequest) -> ClientResult<ApiResponse> {
        let url = self.endpoint(&["attendance", "bulk-update"], None)?;
        self.send(Method::POST, url, Some(request)).await
    }

    pub async fn resident_attendance(
        &self,
        resident_id: &str,
        month: u32,
        year: i32,
    ) -> ClientResult<Vec<AttendanceDay>> {
        let url = self.endpoint(&["resident", resident_id, "attendance"], Some((month, year)))?;
        self.send(Method::GET, url, None::<&()>).await
    }

    pub async fn bill(&self, resident_id: &str, month: u32, year: i32) -> ClientResult<MonthlyBill> {
        let url = self.endpoint(&["resident", resident_id, "bill"], Some((month, year)))?;
        self.send(Method::GET, url, None::<&()>).await
    }

    pub async fn bill_history(&self, resident_id: &str) -> ClientResult<Vec<BillLedgerEntry>> {
        let url = self.endpoint(&["resident", resident_id, "bill-history"], None)?;
        self.send(Method::GET, url, None::<&()>).await
    }

    pub async fn grant_leave(
        &self,
        resident_id: &str,
        request: &LeaveRequest,
    ) -> ClientResult<ApiResponse> {
        let url = self.endpoint(&["resident", resident_id, "leave"], None)?;
        self.send(Method::POST, url, Some(request)).await
    }

    pub async fn revoke_leave(&self, resident_id: &str, date: &str) -> ClientResult<ApiResponse> {
        let url = self.endpoint(&["resident", resident_id, "leave", date], None)?;
        self.send(Method::DELETE, url, None::<&()>).await
    }

    pub async fn finalize_period(&self, month: u32, year: i32) -> ClientResult<Vec<BillLedgerEntry>> {
        let request = FinalizeRequest { month, year };
        let url = self.endpoint(&["billing", "finalize"], None)?;
        self.send(Method::POST, url, Some(&request)).await
    }

    pub async fn billing_rate(&self) -> ClientResult<Decimal> {
        let url = self.endpoint(&["config", "billing-rate"], None)?;
        let rate: BillingRate = self.send(Method::GET, url, None::<&()>).await?;
        Ok(rate.amount_per_day)
    }

    pub async fn set_billing_rate(&self, amount_per_day: Decimal) -> ClientResult<Decimal> {
        let request = BillingRate { amount_per_day };
        let url = self.endpoint(&["config", "billing-rate"], None)?;
        let rate: BillingRate = self.send(Method::PUT, url, Some(&request)).await?;
        Ok(rate.amount_per_day)
    }

    /// 組出端點位址
    ///
    /// 每個路徑片段各自編碼，住宿生ID 中的 `/`、`#`、`?` 不會改變路由。
    fn endpoint(&self, segments: &[&str], period: Option<(u32, i32)>) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{}: cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if let Some((month, year)) = period {
            url.query_pairs_mut()
                .append_pair("month", &month.to_string())
                .append_pair("year", &year.to_string());
        }
        Ok(url)
    }

    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.retry
            .run(|| {
                let request = self.request(method.clone(), url.clone(), body);
                async move {
                    let response = request.send().await.map_err(ClientError::Transport)?;
                    decode(response).await
                }
            })
            .await
    }

    fn request<B>(&self, method: Method, url: Url, body: Option<&B>) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let builder = self.http.request(method, url);
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(ClientError::Decode);
    }

    let message = match response.json::<ApiResponse>().await {
        Ok(ApiResponse {
            error: Some(message),
            ..
        }) => message,
        _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(ClientError::Api { status, message })
}

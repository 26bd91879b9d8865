//! # Mess API
//!
//! HTTP 邊界層：路由、請求/回應類型、客戶端與重試策略

pub mod api_types;
pub mod client;
pub mod retry;
pub mod routes;
pub mod service;

// Re-export 主要類型
pub use client::{ClientError, MessClient};
pub use retry::RetryPolicy;
pub use routes::build_router;
pub use service::MessService;

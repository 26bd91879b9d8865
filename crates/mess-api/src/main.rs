//! mess-server 進入點
//!
//! 只負責初始化追蹤、載入配置與住宿生名冊、掛上中介層並啟動 HTTP 服務。

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use mess_api::{routes, MessService};
use mess_core::{MessConfig, Resident};
use mess_store::InMemoryDirectory;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = MessConfig::from_env().context("invalid configuration")?;
    let directory = Arc::new(load_directory(&config)?);
    let service = Arc::new(
        MessService::in_memory(directory, &config).context("failed to build mess service")?,
    );

    let app = routes::build_router(service).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.bind_addr))?;
    info!(
        "mess-server listening on http://{}（每日費率 {}）",
        addr, config.amount_per_day
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// 載入住宿生名冊（未設定檔案時為空名冊）
fn load_directory(config: &MessConfig) -> anyhow::Result<InMemoryDirectory> {
    let Some(path) = &config.residents_file else {
        tracing::warn!("未設定住宿生名冊檔案，以空名冊啟動");
        return Ok(InMemoryDirectory::new());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read residents file '{}'", path))?;
    let residents: Vec<Resident> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse residents file '{}'", path))?;

    info!("載入住宿生名冊 {}：{} 位", path, residents.len());
    Ok(InMemoryDirectory::from_residents(residents))
}

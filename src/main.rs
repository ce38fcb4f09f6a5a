mod db;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::llm::ChatGateway;
use crate::services::ai::{AiService, RetryPolicy};
use crate::services::prompt::PromptComposer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    let config = llm::AiConfig::from_env().expect("AI gateway config missing");
    let gateway: Arc<dyn ChatGateway> =
        Arc::new(llm::OpenRouterClient::new(&config).expect("gateway client build failed"));
    let policy = RetryPolicy { max_attempts: config.max_attempts, backoff: config.backoff };
    let ai = AiService::new(gateway, config.models.clone(), policy);
    let composer = PromptComposer::from_env();

    let state = state::AppState::new(pool, ai, composer);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "tickettutor listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}

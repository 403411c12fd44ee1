use sea_orm::Database;
use tracing::info;

use soko_core::tracing::init_tracing;
use soko_payments::config::PaymentsConfig;
use soko_payments::infra::mpesa::MpesaClient;
use soko_payments::router::build_router;
use soko_payments::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = PaymentsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let gateway = MpesaClient::new(config.mpesa).expect("failed to build M-Pesa client");

    let state = AppState {
        db,
        gateway,
        callback_lookup: config.callback_lookup,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.payments_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("payments service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}

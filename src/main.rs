use dotenvy::dotenv;
use tracing::info;

use cliniq::infra::{
    app::create_app,
    expiry_scanner::run_expiry_scan_loop,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let (app_state, scanner) = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;
    let scan_interval_secs = app_state.config.scan_interval_secs;

    let app = create_app(app_state);

    // Time-based transitions run independently of request traffic.
    tokio::spawn(async move {
        run_expiry_scan_loop(scanner, scan_interval_secs).await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

use account_store::{state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let app_state = AppState::init().await?;
    app_state.migrate().await?;

    tracing::info!(
        bcrypt_cost = app_state.accounts.bcrypt_cost(),
        "account store ready"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    app_state.shutdown().await;

    Ok(())
}

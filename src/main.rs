use anyhow::Context;
use shelf_app::{build_registry, AppDeps};
use shelf_kernel::{settings::Settings, InitCtx};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        books = settings.store.books.len(),
        "shelf-app bootstrap starting"
    );

    let deps = AppDeps::in_memory(&settings);
    let registry = build_registry(&deps).context("failed to register modules")?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    shelf_http::start_server(&registry, &settings, shutdown_signal()).await?;

    registry.stop_modules().await?;
    tracing::info!("shelf-app shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

use guild_logger::audit::AuditService;
use guild_logger::config::load_settings;
use guild_logger::discord::{AuditEventHandler, gateway_cache_settings, intents};
use guild_logger::error::Result;
use guild_logger::logging::init_tracing;
use serenity::Client;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("🚀 Starting guild logger");

    // Load configuration
    let settings = load_settings()?;
    tracing::info!("✅ Configuration loaded");
    tracing::debug!(
        cache_capacity = settings.cache.capacity,
        cache_ttl_secs = settings.cache.ttl.map(|t| t.as_secs()),
        gateway_messages = settings.cache.gateway_messages,
        "Cache settings"
    );

    // Registry and message cache live for the whole process and start empty
    let service = Arc::new(AuditService::new(&settings.cache));

    let mut client = Client::builder(&settings.discord.token, intents())
        .event_handler(AuditEventHandler::new(service.clone()))
        .cache_settings(gateway_cache_settings(&settings.cache))
        .await?;
    tracing::info!("Discord client created");

    spawn_cache_maintenance(service.clone(), settings.cache.report_interval);

    let shard_manager = client.shard_manager.clone();

    // Run the gateway client until it exits or a signal arrives
    let result: Result<()> = tokio::select! {
        result = client.start() => {
            tracing::info!("Gateway client stopped");
            result.map_err(Into::into)
        }
        signal_name = shutdown_signal() => {
            tracing::info!(
                signal = %signal_name,
                "Received shutdown signal, closing gateway connections"
            );
            shard_manager.shutdown_all().await;
            Ok(())
        }
    };

    tracing::info!(
        configured_guilds = service.registry().len(),
        cached_messages = service.cache().len(),
        "Shutdown complete, in-memory state discarded"
    );
    result
}

/// Periodically drop expired cache entries and log cache statistics
fn spawn_cache_maintenance(service: Arc<AuditService>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            service.cache().purge_expired();
            service.cache().log_stats();
        }
    });
}

/// Wait for SIGINT (Ctrl+C), SIGTERM or SIGQUIT on Unix, Ctrl+C elsewhere
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let (Ok(mut sigint), Ok(mut sigterm), Ok(mut sigquit)) = (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
            signal(SignalKind::quit()),
        ) else {
            tracing::warn!("Failed to install Unix signal handlers, falling back to Ctrl+C");
            let _ = signal::ctrl_c().await;
            return "Ctrl+C";
        };

        tokio::select! {
            _ = sigint.recv() => "SIGINT (Ctrl+C)",
            _ = sigterm.recv() => "SIGTERM",
            _ = sigquit.recv() => "SIGQUIT",
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        "Ctrl+C"
    }
}

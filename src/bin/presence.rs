use anyhow::Context as _;
use guild_logger::config::load_presence_settings;
use guild_logger::logging::init_tracing;
use guild_logger::presence;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_presence_settings().context("loading presence settings")?;
    tracing::info!(client_id = %config.client_id, "Starting rich presence companion");

    let mut client = presence::connect()
        .await
        .context("connecting to the Discord desktop client")?;
    presence::publish(&mut client, &config, chrono::Utc::now().timestamp_millis())
        .await
        .context("publishing activity")?;

    let peer_result = tokio::select! {
        result = client.keep_alive() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match peer_result {
        Some(result) => {
            result.context("IPC connection failed")?;
            tracing::info!("Discord client went away");
        }
        None => {
            tracing::info!("Received Ctrl+C, clearing presence");
            if let Err(e) = client.close().await {
                tracing::warn!(error = %e, "Failed to close IPC connection cleanly");
            }
        }
    }

    Ok(())
}

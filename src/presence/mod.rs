//! Rich Presence companion
//!
//! Publishes one static activity through the local Discord desktop client
//! and keeps the connection open so the activity stays visible.

mod activity;
mod ipc;

pub use activity::{Activity, Assets, Button, Timestamps};
pub use ipc::{Frame, IpcClient, IpcStream, Opcode, ReadyInfo, connect, encode_frame};

use crate::config::PresenceConfig;
use crate::error::Result;
use serde_json::json;

/// Handshake, then publish the configured activity once.
pub async fn publish<S: IpcStream>(
    client: &mut IpcClient<S>,
    config: &PresenceConfig,
    started_at_ms: i64,
) -> Result<ReadyInfo> {
    let ready = client.handshake(&config.client_id).await?;
    tracing::info!(user = ?ready.username, "Rich presence connected");

    let activity = Activity::from_config(config, started_at_ms);
    client
        .command(
            "SET_ACTIVITY",
            json!({ "pid": std::process::id(), "activity": activity }),
        )
        .await?;
    tracing::info!(details = %activity.details, state = %activity.state, "Rich presence active");
    Ok(ready)
}

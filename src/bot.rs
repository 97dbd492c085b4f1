use std::sync::Arc;

use serenity::{gateway::ShardManager, prelude::*, Client as DiscordClient};
use tracing::info;

use crate::{
    config::RelayConfig,
    cooldown::CooldownTracker,
    error::RelayError,
    handler::Handler,
    health::HealthChecker,
    messages::MessageCycler,
    pipeline::NotifyPipeline,
    routing::GuildRoutingTable,
};

/// Builds the relay from config. Fails before any connection is made if the
/// config is inconsistent.
pub fn build_pipeline(config: &RelayConfig) -> Result<NotifyPipeline, RelayError> {
    let routes = GuildRoutingTable::from_servers(&config.servers)?;
    let cycler = MessageCycler::from_clock(config.message_pool())?;
    Ok(NotifyPipeline::new(
        routes,
        CooldownTracker::new(config.rate_limit_period()),
        cycler,
        config.fetch_timeout(),
    ))
}

/// Receives voice events from Discord and posts update messages.
pub struct DomoBot {
    client: DiscordClient,
    health: HealthChecker,
}

impl DomoBot {
    pub async fn new(token: &str, config: &RelayConfig) -> Result<Self, RelayError> {
        let pipeline = Arc::new(build_pipeline(config)?);
        let health = HealthChecker::new(pipeline.routes().len());
        let handler = Handler {
            pipeline,
            health: health.clone(),
            status: config.status.clone(),
        };

        // GUILDS keeps the cache populated so previous voice states are known.
        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;

        let client = DiscordClient::builder(token, intents)
            .event_handler(handler)
            .await
            .map_err(RelayError::Connection)?;

        Ok(Self { client, health })
    }

    pub fn health(&self) -> HealthChecker {
        self.health.clone()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shard_manager: self.client.shard_manager.clone(),
            health: self.health.clone(),
        }
    }

    /// Opens the gateway connection and runs until every shard is shut down.
    pub async fn start(&mut self) -> Result<(), RelayError> {
        info!("Opening Discord gateway connection");
        self.client.start().await.map_err(RelayError::Connection)
    }
}

/// Closes the connection of a running [`DomoBot`] from another task.
#[derive(Clone)]
pub struct StopHandle {
    shard_manager: Arc<ShardManager>,
    health: HealthChecker,
}

impl StopHandle {
    pub async fn stop(&self) {
        info!("Closing Discord gateway connection");
        self.shard_manager.shutdown_all().await;
        self.health.set_connected(false).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_build_pipeline_from_config() {
        let cfg = RelayConfig::from_json(
            r#"{"servers":[{"guild_id":"G1","domo_update_channel_id":"C1"}],"rate_limit_sec":30}"#,
        )
        .unwrap();
        let pipeline = build_pipeline(&cfg).unwrap();
        assert_eq!(pipeline.routes().notify_channel_for("G1"), Some("C1"));
    }

    #[test]
    fn test_build_pipeline_rejects_duplicates() {
        let cfg = RelayConfig {
            servers: vec![
                crate::config::ServerEntry {
                    guild_id: "G1".into(),
                    update_channel_id: "C1".into(),
                },
                crate::config::ServerEntry {
                    guild_id: "G1".into(),
                    update_channel_id: "C2".into(),
                },
            ],
            rate_limit_sec: 0,
            status: String::new(),
            fetch_timeout_sec: 0,
            messages: None,
        };
        assert!(matches!(
            build_pipeline(&cfg),
            Err(RelayError::Config(ConfigError::DuplicateGuild(_)))
        ));
    }
}

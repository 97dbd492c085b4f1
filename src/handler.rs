use std::sync::Arc;

use serenity::{
    all::{ActivityData, ConnectionStage, ShardStageUpdateEvent, VoiceState},
    async_trait,
    model::gateway::Ready,
    prelude::*,
};
use tracing::{error, info};

use crate::{
    health::HealthChecker,
    metrics::VOICE_EVENTS,
    pipeline::NotifyPipeline,
    platform::SerenityPlatform,
    schema::{PreviousVoiceState, VoiceStateEvent},
};

pub struct Handler {
    pub pipeline: Arc<NotifyPipeline>,
    pub health: HealthChecker,
    pub status: String,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        ctx.set_activity(Some(ActivityData::playing(self.status.clone())));
        self.health.set_connected(true).await;
        info!(
            guilds = self.pipeline.routes().len(),
            "domo bot is now running"
        );
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        let connected = stage_is_connected(event.new);
        if connected != stage_is_connected(event.old) {
            info!(shard = ?event.shard_id, stage = ?event.new, "Gateway stage changed");
        }
        self.health.set_connected(connected).await;
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(event) = to_event(old.as_ref(), &new) else {
            return;
        };
        VOICE_EVENTS.inc();

        let platform = SerenityPlatform::new(ctx.http.clone());
        if let Err(err) = self.pipeline.process(&platform, &event).await {
            error!(guild_id = %event.guild_id, error = %err, "Failed to handle voice state update");
        }
    }
}

/// Only a fully established session counts as healthy; resuming and
/// handshaking stages do not.
pub fn stage_is_connected(stage: ConnectionStage) -> bool {
    matches!(stage, ConnectionStage::Connected)
}

/// Converts serenity's voice state pair into a relay event. Events outside a
/// guild are dropped.
pub fn to_event(old: Option<&VoiceState>, new: &VoiceState) -> Option<VoiceStateEvent> {
    let guild_id = new.guild_id?;
    Some(VoiceStateEvent {
        guild_id: guild_id.to_string(),
        channel_id: new.channel_id.map(|c| c.to_string()).unwrap_or_default(),
        previous: old.and_then(|prev| {
            prev.guild_id.map(|g| PreviousVoiceState {
                guild_id: g.to_string(),
                channel_id: prev.channel_id.map(|c| c.to_string()),
            })
        }),
        suppress: new.suppress,
        self_mute: new.self_mute,
        self_deaf: new.self_deaf,
        mute: new.mute,
        deaf: new.deaf,
    })
}

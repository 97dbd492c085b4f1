use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    cooldown::CooldownTracker,
    error::RelayError,
    messages::MessageCycler,
    metrics::{
        DELIVERY_FAILURES, EVENTS_SKIPPED, METADATA_FETCH_DURATION, METADATA_FETCH_FAILURES,
        NOTIFICATIONS_SENT,
    },
    platform::ChannelPlatform,
    routing::GuildRoutingTable,
    schema::{ChannelKind, ChannelMetadata, VoiceStateEvent},
};

/// Why an event did not produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnmonitoredGuild,
    LeftVoice,
    MutedOrDeafened,
    ChannelSwitch,
    NotVoiceChannel,
    CategoryMismatch,
    RateLimited,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::UnmonitoredGuild => "guild not monitored",
            SkipReason::LeftVoice => "not a join",
            SkipReason::MutedOrDeafened => "user muted or deafened",
            SkipReason::ChannelSwitch => "channel switch within guild",
            SkipReason::NotVoiceChannel => "not a voice channel",
            SkipReason::CategoryMismatch => "category differs from update channel",
            SkipReason::RateLimited => "guild updated recently",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Notified { channel_id: String, message: String },
}

/// Mutable relay state. Kept together so a single lock covers both.
#[derive(Debug)]
pub struct RelayState {
    pub cooldown: CooldownTracker,
    pub cycler: MessageCycler,
}

/// Decides, one voice event at a time, whether a guild's update channel
/// should be notified.
pub struct NotifyPipeline {
    routes: GuildRoutingTable,
    fetch_timeout: Option<Duration>,
    state: Mutex<RelayState>,
}

impl NotifyPipeline {
    pub fn new(
        routes: GuildRoutingTable,
        cooldown: CooldownTracker,
        cycler: MessageCycler,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        Self {
            routes,
            fetch_timeout,
            state: Mutex::new(RelayState { cooldown, cycler }),
        }
    }

    pub fn routes(&self) -> &GuildRoutingTable {
        &self.routes
    }

    /// Exposes the shared state, mostly for inspection in tests.
    pub fn state(&self) -> &Mutex<RelayState> {
        &self.state
    }

    pub async fn process<P>(
        &self,
        platform: &P,
        event: &VoiceStateEvent,
    ) -> Result<Outcome, RelayError>
    where
        P: ChannelPlatform + ?Sized,
    {
        self.process_at(platform, event, Instant::now()).await
    }

    /// Runs the filters in order, cheapest first. Network lookups only happen
    /// once every local check has passed.
    pub async fn process_at<P>(
        &self,
        platform: &P,
        event: &VoiceStateEvent,
        now: Instant,
    ) -> Result<Outcome, RelayError>
    where
        P: ChannelPlatform + ?Sized,
    {
        let Some(update_channel_id) = self.routes.notify_channel_for(&event.guild_id) else {
            return Ok(Outcome::Skipped(SkipReason::UnmonitoredGuild));
        };

        if event.is_leave() {
            return Ok(skip(event, SkipReason::LeftVoice));
        }

        // AFK users are usually muted and moved, so this drops them too.
        if event.is_muted_or_deafened() {
            return Ok(skip(event, SkipReason::MutedOrDeafened));
        }

        // Only as good as the platform cache; a cold cache lets moves through.
        if event.is_same_guild_switch() {
            return Ok(skip(event, SkipReason::ChannelSwitch));
        }

        let joined = self.fetch(platform, &event.channel_id).await?;
        if joined.kind != ChannelKind::Voice {
            return Ok(skip(event, SkipReason::NotVoiceChannel));
        }

        // Category stands in for visibility: joins to channels outside the
        // update channel's category are never announced.
        let update_channel = self.fetch(platform, update_channel_id).await?;
        if update_channel.parent_id != joined.parent_id {
            return Ok(skip(event, SkipReason::CategoryMismatch));
        }

        let message = {
            let mut state = self.state.lock().await;
            if state.cooldown.is_suppressed(&event.guild_id, now) {
                drop(state);
                return Ok(skip(event, SkipReason::RateLimited));
            }
            state.cooldown.record_notification(&event.guild_id, now);
            state.cycler.next_message()
        };

        // The cooldown stays committed even if this send fails.
        if let Err(source) = platform.send_message(update_channel_id, &message).await {
            DELIVERY_FAILURES.inc();
            return Err(RelayError::Delivery {
                channel_id: update_channel_id.to_string(),
                source,
            });
        }

        NOTIFICATIONS_SENT.inc();
        info!(
            guild_id = %event.guild_id,
            channel_id = %update_channel_id,
            "Sent update message"
        );
        Ok(Outcome::Notified {
            channel_id: update_channel_id.to_string(),
            message,
        })
    }

    async fn fetch<P>(&self, platform: &P, channel_id: &str) -> Result<ChannelMetadata, RelayError>
    where
        P: ChannelPlatform + ?Sized,
    {
        let _timer = METADATA_FETCH_DURATION.start_timer();
        let lookup = platform.fetch_channel_metadata(channel_id);
        let result = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, lookup).await {
                Ok(result) => result,
                Err(_) => {
                    METADATA_FETCH_FAILURES.inc();
                    return Err(RelayError::FetchTimeout {
                        channel_id: channel_id.to_string(),
                    });
                }
            },
            None => lookup.await,
        };
        result.map_err(|source| {
            METADATA_FETCH_FAILURES.inc();
            RelayError::MetadataFetch {
                channel_id: channel_id.to_string(),
                source,
            }
        })
    }
}

fn skip(event: &VoiceStateEvent, reason: SkipReason) -> Outcome {
    EVENTS_SKIPPED.inc();
    debug!(guild_id = %event.guild_id, channel_id = %event.channel_id, %reason, "Skipping voice event");
    Outcome::Skipped(reason)
}

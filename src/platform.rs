use std::sync::Arc;

use serenity::{
    all::{Channel, ChannelId, ChannelType, CreateMessage},
    async_trait,
    http::Http,
};

use crate::error::PlatformError;
use crate::schema::{ChannelKind, ChannelMetadata};

/// The chat-platform calls the relay needs.
#[async_trait]
pub trait ChannelPlatform: Send + Sync {
    async fn fetch_channel_metadata(&self, channel_id: &str)
        -> Result<ChannelMetadata, PlatformError>;

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError>;
}

/// Discord REST access through serenity.
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Snowflakes are non-zero integers; anything else is rejected before a
/// request is made.
pub fn parse_channel_id(raw: &str) -> Result<ChannelId, PlatformError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(ChannelId::new(id)),
        _ => Err(PlatformError::InvalidId(raw.to_string())),
    }
}

pub fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Voice => ChannelKind::Voice,
        _ => ChannelKind::Other,
    }
}

#[async_trait]
impl ChannelPlatform for SerenityPlatform {
    async fn fetch_channel_metadata(
        &self,
        channel_id: &str,
    ) -> Result<ChannelMetadata, PlatformError> {
        let id = parse_channel_id(channel_id)?;
        match self.http.get_channel(id).await? {
            Channel::Guild(channel) => Ok(ChannelMetadata {
                channel_id: channel.id.to_string(),
                kind: channel_kind(channel.kind),
                parent_id: channel.parent_id.map(|p| p.to_string()),
            }),
            _ => Err(PlatformError::NotGuildChannel(channel_id.to_string())),
        }
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError> {
        let id = parse_channel_id(channel_id)?;
        id.send_message(&*self.http, CreateMessage::new().content(text))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_id() {
        assert_eq!(
            parse_channel_id("1383876896420528179").unwrap(),
            ChannelId::new(1383876896420528179)
        );
        assert!(matches!(parse_channel_id("0"), Err(PlatformError::InvalidId(_))));
        assert!(matches!(parse_channel_id(""), Err(PlatformError::InvalidId(_))));
        assert!(matches!(parse_channel_id("C1"), Err(PlatformError::InvalidId(_))));
    }

    #[test]
    fn test_only_plain_voice_counts_as_voice() {
        assert_eq!(channel_kind(ChannelType::Voice), ChannelKind::Voice);
        assert_eq!(channel_kind(ChannelType::Stage), ChannelKind::Other);
        assert_eq!(channel_kind(ChannelType::Text), ChannelKind::Other);
        assert_eq!(channel_kind(ChannelType::Category), ChannelKind::Other);
    }
}

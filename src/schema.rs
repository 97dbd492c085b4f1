use serde::{Deserialize, Serialize};

/// Snapshot of where a user was before a voice state change, as remembered
/// by the platform cache. Absent when the cache has no record, which lets
/// more events through rather than fewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousVoiceState {
    pub guild_id: String,
    pub channel_id: Option<String>,
}

/// A voice presence change delivered by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStateEvent {
    pub guild_id: String,
    /// Empty when the user left every voice channel.
    pub channel_id: String,
    pub previous: Option<PreviousVoiceState>,
    pub suppress: bool,
    pub self_mute: bool,
    pub self_deaf: bool,
    pub mute: bool,
    pub deaf: bool,
}

impl VoiceStateEvent {
    pub fn is_leave(&self) -> bool {
        self.channel_id.is_empty()
    }

    pub fn is_muted_or_deafened(&self) -> bool {
        self.suppress || self.self_mute || self.self_deaf || self.mute || self.deaf
    }

    /// True when the user moved between channels of the same guild.
    pub fn is_same_guild_switch(&self) -> bool {
        self.previous
            .as_ref()
            .is_some_and(|prev| prev.guild_id == self.guild_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    Voice,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub channel_id: String,
    pub kind: ChannelKind,
    pub parent_id: Option<String>,
}

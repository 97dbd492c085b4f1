use std::collections::HashMap;

use crate::config::ServerEntry;
use crate::error::ConfigError;

/// Maps each monitored guild to the channel that receives its updates.
#[derive(Debug, Clone, Default)]
pub struct GuildRoutingTable {
    channels: HashMap<String, String>,
}

impl GuildRoutingTable {
    pub fn from_servers(servers: &[ServerEntry]) -> Result<Self, ConfigError> {
        let mut channels = HashMap::with_capacity(servers.len());
        for server in servers {
            if channels
                .insert(server.guild_id.clone(), server.update_channel_id.clone())
                .is_some()
            {
                return Err(ConfigError::DuplicateGuild(server.guild_id.clone()));
            }
        }
        Ok(Self { channels })
    }

    /// `None` means the guild is not monitored.
    pub fn notify_channel_for(&self, guild_id: &str) -> Option<&str> {
        self.channels.get(guild_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(guild: &str, channel: &str) -> ServerEntry {
        ServerEntry {
            guild_id: guild.into(),
            update_channel_id: channel.into(),
        }
    }

    #[test]
    fn test_lookup_configured_and_unknown() {
        let servers = vec![entry("G1", "C1"), entry("G2", "C2"), entry("G3", "C1")];
        let table = GuildRoutingTable::from_servers(&servers).unwrap();

        for server in &servers {
            assert_eq!(
                table.notify_channel_for(&server.guild_id),
                Some(server.update_channel_id.as_str())
            );
        }
        assert_eq!(table.notify_channel_for("G4"), None);
        assert_eq!(table.notify_channel_for(""), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_duplicate_guild_rejected() {
        let err = GuildRoutingTable::from_servers(&[entry("G1", "C1"), entry("G1", "C2")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateGuild(g) if g == "G1"));
    }

    #[test]
    fn test_empty_table_monitors_nothing() {
        let table = GuildRoutingTable::from_servers(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.notify_channel_for("G1"), None);
    }
}

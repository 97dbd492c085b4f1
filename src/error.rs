use thiserror::Error;

type DynErr = Box<dyn std::error::Error + Send + Sync>;

/// Problems found while loading the relay configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("guild {0} is listed more than once")]
    DuplicateGuild(String),

    #[error("message pool must contain at least one message")]
    EmptyMessagePool,
}

/// Failures reported by the chat platform.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("invalid channel id {0:?}")]
    InvalidId(String),

    #[error("channel {0} is not a guild channel")]
    NotGuildChannel(String),

    #[error("platform request failed: {0}")]
    Request(#[source] DynErr),
}

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        PlatformError::Request(Box::new(err))
    }
}

/// Errors surfaced by the relay. Skipped events are never errors.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("error getting channel {channel_id}: {source}")]
    MetadataFetch {
        channel_id: String,
        #[source]
        source: PlatformError,
    },

    #[error("timed out getting channel {channel_id}")]
    FetchTimeout { channel_id: String },

    #[error("error sending update message to {channel_id}: {source}")]
    Delivery {
        channel_id: String,
        #[source]
        source: PlatformError,
    },

    #[error("error opening session: {0}")]
    Connection(#[source] serenity::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub mod bot;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod handler;
pub mod health;
pub mod messages;
pub mod metrics;
pub mod pipeline;
pub mod platform;
pub mod routing;
pub mod schema;

use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub gateway_connected: bool,
    pub monitored_guilds: usize,
}

/// Tracks whether the gateway session is up. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct HealthChecker {
    gateway_connected: Arc<Mutex<bool>>,
    monitored_guilds: usize,
}

impl HealthChecker {
    pub fn new(monitored_guilds: usize) -> Self {
        Self {
            gateway_connected: Arc::new(Mutex::new(false)),
            monitored_guilds,
        }
    }

    pub async fn set_connected(&self, connected: bool) {
        *self.gateway_connected.lock().await = connected;
    }

    pub async fn get_overall_health(&self) -> HealthStatus {
        let connected = *self.gateway_connected.lock().await;
        HealthStatus {
            status: if connected { "healthy" } else { "degraded" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            gateway_connected: connected,
            monitored_guilds: self.monitored_guilds,
        }
    }
}

//! Engine configuration.

use chrono::Duration;

/// Configuration for the versioning engine and its adapters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum age an address-change-flagged node snapshot must reach
    /// before a further address change is versioned again.
    ///
    /// Caps churn from badly configured nodes to one recorded address
    /// change per window per identity.
    pub ip_change_cooldown: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ip_change_cooldown: Duration::days(1),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address-change suppression window.
    #[must_use]
    pub fn ip_change_cooldown(mut self, cooldown: Duration) -> Self {
        self.ip_change_cooldown = cooldown;
        self
    }
}

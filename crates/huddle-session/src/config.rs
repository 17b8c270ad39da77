//! Session coordinator configuration.

/// Configuration for the session coordinator.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the coordinator's input queue (commands plus
    /// forwarded callbacks). Senders wait when it is full.
    pub queue_capacity: usize,

    /// Capacity of the observer event channel. A subscriber that lags
    /// behind by more than this many events starts missing the oldest.
    pub event_capacity: usize,

    /// Prefix for generated lobby display names; a random 0-99 suffix is
    /// appended when hosting (e.g. `"lobby-"` → `"lobby-42"`).
    pub lobby_name_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            event_capacity: 64,
            lobby_name_prefix: "lobby-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.lobby_name_prefix, "lobby-");
    }
}

//! Channel configuration for worker -> engine communication

/// Channel buffer configuration for outcome collection
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Outcome channel buffer size (workers -> collection point)
    pub outcome_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            outcome_buffer: 1_024,
        }
    }
}

impl ChannelConfig {
    /// Create a new channel config with a custom outcome buffer size
    ///
    /// `tokio::sync::mpsc` rejects a zero capacity, so the size is clamped to 1.
    pub fn with_outcome_buffer(mut self, size: usize) -> Self {
        self.outcome_buffer = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_config_default() {
        let config = ChannelConfig::default();
        assert_eq!(config.outcome_buffer, 1_024);
    }

    #[test]
    fn test_channel_config_builder() {
        let config = ChannelConfig::default().with_outcome_buffer(16);
        assert_eq!(config.outcome_buffer, 16);
    }

    #[test]
    fn test_channel_config_zero_is_clamped() {
        let config = ChannelConfig::default().with_outcome_buffer(0);
        assert_eq!(config.outcome_buffer, 1);
    }
}

//! Timeline controller settings

use serde::{Deserialize, Serialize};
use tempora_core::Dimension;

/// How the timeline controller starts up
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Dimension that is current when the controller is created
    pub starting_dimension: Dimension,
    /// Whether switching is unlocked from the start
    pub switching_enabled: bool,
    /// Whether `switch_to` itself rejects requests while switching is locked
    pub enforce_gate: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            starting_dimension: Dimension::Present,
            switching_enabled: false,
            enforce_gate: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = TimelineSettings::default();
        assert_eq!(settings.starting_dimension, Dimension::Present);
        assert!(!settings.switching_enabled);
        assert!(settings.enforce_gate);
    }
}

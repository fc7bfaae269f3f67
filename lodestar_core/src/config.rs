// lodestar_core/src/config.rs

use serde::{Deserialize, Serialize};

/// Operational parameters for the ingestion controller.
///
/// Every field carries a serde default so a partial config file
/// deserializes to a working configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Maximum number of finalized batches held for the worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Motion gate: minimum translation between captures (distance units,
    /// strict greater-than).
    #[serde(default = "default_translation_threshold")]
    pub translation_threshold: f64,

    /// Motion gate: minimum rotation about any single axis (degrees,
    /// strict greater-than).
    #[serde(default = "default_rotation_threshold_deg")]
    pub rotation_threshold_deg: f64,

    /// Localize against a prior map. When set, the initial pose marker and
    /// a loaded map are required before localization can start.
    #[serde(default)]
    pub map_based_localization: bool,

    /// Report overlap/alignability/risk scalars with each corrected pose.
    #[serde(default)]
    pub publish_diagnostics: bool,
}

fn default_queue_capacity() -> usize {
    100
}

fn default_translation_threshold() -> f64 {
    1.0
}

fn default_rotation_threshold_deg() -> f64 {
    10.0
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            translation_threshold: default_translation_threshold(),
            rotation_threshold_deg: default_rotation_threshold_deg(),
            map_based_localization: false,
            publish_diagnostics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_matches_defaults() {
        let from_empty: ControllerConfig = toml::from_str("").unwrap();
        let defaults = ControllerConfig::default();
        assert_eq!(from_empty.queue_capacity, defaults.queue_capacity);
        assert_eq!(
            from_empty.translation_threshold,
            defaults.translation_threshold
        );
        assert_eq!(
            from_empty.rotation_threshold_deg,
            defaults.rotation_threshold_deg
        );
        assert_eq!(
            from_empty.map_based_localization,
            defaults.map_based_localization
        );
        assert_eq!(from_empty.publish_diagnostics, defaults.publish_diagnostics);
    }
}

use reflex_timing::DelayPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub delay: DelayPolicy,
}

impl TrialConfig {
    pub fn with_delay(delay: DelayPolicy) -> Self {
        Self { delay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delay_window_is_one_to_four_seconds() {
        let cfg = TrialConfig::default();
        assert_eq!(cfg.delay.min_ms, 1000);
        assert_eq!(cfg.delay.min_ms + cfg.delay.spread_ms, 4000);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: TrialConfig = serde_json::from_str(r#"{"delay":{"min_ms":500}}"#).unwrap();
        assert_eq!(cfg.delay.min_ms, 500);
        assert_eq!(cfg.delay.spread_ms, 3000);
    }
}

//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Ambient engine configuration, read from the environment. There is no persistence or network
// layer in this core, so this is limited to the one knob the CLI binary actually needs: the
// tracing log level. No broker URL, no instrument list — this engine is single-symbol and
// in-memory only.
//--------------------------------------------------------------------------------------------------

use std::env;

const LOG_LEVEL: &str = "CLOB_LOG_LEVEL";

/// Runtime configuration for the CLI binary. The library crate itself (`OrderBook`) takes no
/// configuration — it is a pure in-memory data structure.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"clob=debug"`.
    pub log_level: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let log_level = env::var(LOG_LEVEL).unwrap_or_else(|_| "info".to_string());
        EngineConfig { log_level }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { log_level: "info".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_level_is_info() {
        assert_eq!(EngineConfig::default().log_level, "info");
    }
}

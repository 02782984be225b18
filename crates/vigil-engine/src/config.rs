//! Engine and search configuration, loadable from JSON or any serde format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_HASH_MB: usize = 1 << 16;
pub const MAX_THREADS: usize = 512;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("hash size {0} MB is outside 1..=65536")]
    HashSize(usize),
    #[error("thread count {0} is outside 1..=512")]
    Threads(usize),
    #[error("search parameter `{name}` must be {expected}, got {value}")]
    Parameter {
        name: &'static str,
        expected: &'static str,
        value: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hash_mb: usize,
    pub threads: usize,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            hash_mb: 16,
            threads: 1,
            search: SearchConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_HASH_MB).contains(&self.hash_mb) {
            return Err(ConfigError::HashSize(self.hash_mb));
        }
        if !(1..=MAX_THREADS).contains(&self.threads) {
            return Err(ConfigError::Threads(self.threads));
        }
        self.search.validate()
    }
}

/// Pruning, reduction and extension parameters. Margins are centipawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub static_null_margin: i32,
    pub static_null_max_depth: i32,
    pub razor_margin: i32,
    pub razor_max_depth: i32,
    pub null_move_min_depth: i32,
    /// Null-move results at or above this depth are verified.
    pub null_move_verify_depth: i32,
    /// Eval surplus over beta per extra ply of null-move reduction.
    pub null_move_divisor: i32,
    pub probcut_min_depth: i32,
    pub probcut_margin: i32,
    pub singular_min_depth: i32,
    pub double_extension_margin: i32,
    pub max_double_extensions: u8,
    pub iid_min_depth: i32,
    pub lmr_min_depth: i32,
    pub lmp_max_depth: i32,
    pub futility_max_depth: i32,
    pub futility_margin: i32,
    pub see_prune_max_depth: i32,
    /// Captures losing more than this per ply of depth are pruned.
    pub see_capture_margin: i32,
    pub qsearch_futility_margin: i32,
    /// Past this many quiescence plies only recaptures are searched.
    pub qsearch_recapture_ply: usize,
    pub aspiration_min_depth: i32,
    pub aspiration_window: i32,
    /// TT cutoffs are refused once the half-move clock reaches this.
    pub tt_max_halfmove: u16,
    /// Disables forward pruning so mates are found at their true depth.
    pub mate_finder: bool,
    pub use_tt: bool,
    pub tb_probe_depth: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            static_null_margin: 80,
            static_null_max_depth: 6,
            razor_margin: 200,
            razor_max_depth: 3,
            null_move_min_depth: 2,
            null_move_verify_depth: 12,
            null_move_divisor: 180,
            probcut_min_depth: 5,
            probcut_margin: 80,
            singular_min_depth: 8,
            double_extension_margin: 16,
            max_double_extensions: 6,
            iid_min_depth: 7,
            lmr_min_depth: 2,
            lmp_max_depth: 8,
            futility_max_depth: 8,
            futility_margin: 100,
            see_prune_max_depth: 6,
            see_capture_margin: 100,
            qsearch_futility_margin: 132,
            qsearch_recapture_ply: 5,
            aspiration_min_depth: 4,
            aspiration_window: 20,
            tt_max_halfmove: 92,
            mate_finder: false,
            use_tt: true,
            tb_probe_depth: 0,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("null_move_divisor", self.null_move_divisor),
            ("aspiration_window", self.aspiration_window),
            ("null_move_min_depth", self.null_move_min_depth),
        ];
        for (name, value) in positive {
            if value <= 0 {
                return Err(ConfigError::Parameter { name, expected: "positive", value });
            }
        }
        let non_negative = [
            ("static_null_margin", self.static_null_margin),
            ("razor_margin", self.razor_margin),
            ("probcut_margin", self.probcut_margin),
            ("futility_margin", self.futility_margin),
            ("see_capture_margin", self.see_capture_margin),
            ("qsearch_futility_margin", self.qsearch_futility_margin),
            ("double_extension_margin", self.double_extension_margin),
            ("tb_probe_depth", self.tb_probe_depth),
        ];
        for (name, value) in non_negative {
            if value < 0 {
                return Err(ConfigError::Parameter { name, expected: "non-negative", value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn bad_values_are_named() {
        let config = EngineConfig { hash_mb: 0, ..EngineConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::HashSize(0)));
        let config = EngineConfig { threads: 10_000, ..EngineConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::Threads(10_000)));

        let mut config = EngineConfig::default();
        config.search.null_move_divisor = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Parameter { name: "null_move_divisor", .. })
        ));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "threads": 4, "search": { "mate_finder": true } }"#).unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.hash_mb, 16);
        assert!(config.search.mate_finder);
        assert_eq!(config.search.razor_margin, SearchConfig::default().razor_margin);
    }

    #[test]
    fn error_messages_read_well() {
        let err = ConfigError::Parameter {
            name: "razor_margin",
            expected: "non-negative",
            value: -3,
        };
        assert_eq!(err.to_string(), "search parameter `razor_margin` must be non-negative, got -3");
    }
}

//! Engine configuration
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```json
//! { "maxDepth": 8, "timeLimitMs": 2000, "rule": "freestyle", "eval": { "enableVCT": true } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::eval::EvalOptions;
use crate::rules::RuleKind;

/// Limits and switches for one [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Deepest alpha-beta iteration
    pub max_depth: u32,
    /// Wall-clock budget for the alpha-beta stage
    pub time_limit_ms: u64,
    /// Optional alpha-beta node budget
    pub node_limit: Option<u64>,
    /// Transposition table capacity in entries
    pub tt_max_entries: usize,
    /// Root move jitter in `[0, 1]`; 0 plays deterministically
    pub randomness: f64,
    pub rule: RuleKind,
    /// Budget of the engine's own VCF stage
    pub vcf_time_limit_ms: u64,
    /// Budget of the Mise-VCF stage
    pub mise_vcf_time_limit_ms: u64,
    pub use_mise_vcf: bool,
    pub eval: EvalOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            time_limit_ms: 1000,
            node_limit: None,
            tt_max_entries: 1 << 20,
            randomness: 0.0,
            rule: RuleKind::Renju,
            vcf_time_limit_ms: 100,
            mise_vcf_time_limit_ms: 200,
            use_mise_vcf: true,
            eval: EvalOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let data = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&data)
    }

    /// Load a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::Config(format!("failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_depth == 0 {
            return Err(EngineError::Config("maxDepth must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.randomness) {
            return Err(EngineError::Config(format!(
                "randomness must be within [0, 1], got {}",
                self.randomness
            )));
        }
        if self.tt_max_entries == 0 {
            return Err(EngineError::Config("ttMaxEntries must be positive".to_string()));
        }
        Ok(())
    }
}

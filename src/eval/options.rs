//! Evaluation options

use serde::{Deserialize, Serialize};

/// Toggles for the tactical rules applied by the evaluator.
///
/// Supplied per search; nothing here is global.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvalOptions {
    /// Reward fours that keep a follow-up VCF in reserve
    pub enable_fukumi: bool,
    /// Reward three-making moves that set up a four-three
    pub enable_mise: bool,
    /// Reward White fours whose block is forbidden for Black
    pub enable_forbidden_trap: bool,
    /// Bonus for double threats (four-three, four-four, three-three)
    pub enable_multi_threat: bool,
    /// Let a four answer an open three instead of blocking it
    pub enable_counter_four: bool,
    /// Reward open threes that win by continuous threats
    #[serde(rename = "enableVCT", alias = "enableVct")]
    pub enable_vct: bool,
    /// Moves that leave a live opponent threat unanswered score `-INFINITY`
    pub enable_mandatory_defense: bool,
    /// Penalise lone fours that create no second threat
    pub enable_single_four_penalty: bool,
    pub single_four_penalty_multiplier: f64,
    /// Treat opponent four-three setup squares as mandatory defense
    pub enable_mise_threat: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            enable_fukumi: false,
            enable_mise: true,
            enable_forbidden_trap: true,
            enable_multi_threat: true,
            enable_counter_four: true,
            enable_vct: false,
            enable_mandatory_defense: true,
            enable_single_four_penalty: true,
            single_four_penalty_multiplier: 0.5,
            enable_mise_threat: true,
        }
    }
}

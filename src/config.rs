//! Session and difficulty configuration.
//!
//! All game knobs live in an immutable [`SessionConfig`] captured at
//! session creation. Difficulty presets bundle the banded defect-rate
//! ranges with suggested parameters; the instructor can override any of
//! them per session.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Named difficulty preset selecting banded defect-rate ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Wide spread of defect rates; bands are easy to tell apart.
    Easy,
    /// Moderate clustering.
    #[default]
    Medium,
    /// Tightly clustered rates; narrow intervals are risky.
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Stable string key, used in event payloads and CLI args.
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// The preset bundled with this difficulty.
    pub fn preset(self) -> &'static DifficultyPreset {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(GameError::UnknownDifficulty(other.to_string())),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Banded probability ranges plus suggested session parameters.
///
/// Batch index i draws from band `p_ranges[i % p_ranges.len()]`; the
/// generated sequence is then shuffled so band position gives nothing
/// away.
#[derive(Debug, Clone)]
pub struct DifficultyPreset {
    /// Short human description shown on the session form.
    pub description: &'static str,
    /// Inclusive [lo, hi] defect-rate bands.
    pub p_ranges: &'static [(f64, f64)],
    /// Suggested number of batches.
    pub device_count: usize,
    /// Suggested turn allowance.
    pub max_turns: u32,
    /// Suggested total inspection budget (samples).
    pub test_budget: u32,
    /// Suggested minimum sample size per test.
    pub min_n: u32,
    /// Suggested maximum sample size per test.
    pub max_n: u32,
}

static EASY: DifficultyPreset = DifficultyPreset {
    description: "wide spread of defect rates",
    p_ranges: &[(0.05, 0.25), (0.35, 0.65), (0.75, 0.95)],
    device_count: 8,
    max_turns: 20,
    test_budget: 500,
    min_n: 5,
    max_n: 100,
};

static MEDIUM: DifficultyPreset = DifficultyPreset {
    description: "moderate clustering",
    p_ranges: &[(0.15, 0.40), (0.40, 0.70), (0.60, 0.85)],
    device_count: 10,
    max_turns: 20,
    test_budget: 400,
    min_n: 5,
    max_n: 80,
};

static HARD: DifficultyPreset = DifficultyPreset {
    description: "tightly clustered rates",
    p_ranges: &[(0.25, 0.50), (0.45, 0.65), (0.50, 0.75)],
    device_count: 12,
    max_turns: 18,
    test_budget: 300,
    min_n: 10,
    max_n: 60,
};

/// Pricing for mid-game purchases of extra allowances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Score cost of one extra turn.
    pub turn_cost: i64,
    /// Score cost of one budget refill.
    pub budget_cost: i64,
    /// Samples added per budget refill.
    pub budget_amount: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            turn_cost: 60,
            budget_cost: 40,
            budget_amount: 50,
        }
    }
}

/// Immutable per-session game configuration.
///
/// Captured once at session creation; the executors only ever read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of batches with hidden defect rates.
    pub device_count: usize,
    /// Base turn allowance per player.
    pub max_turns: u32,
    /// Base inspection budget per player (total samples).
    pub test_budget: u32,
    /// Minimum sample size per test.
    pub min_n: u32,
    /// Maximum sample size per test.
    pub max_n: u32,
    /// Premium scale factor; premium = floor(scale * (1 - width)^2 * bonus).
    pub premium_scale: i64,
    /// Confidence level key -> premium multiplier.
    pub confidence_bonus: BTreeMap<String, f64>,
    /// Confidence level key -> penalty on a missed interval.
    pub miss_penalty: BTreeMap<String, i64>,
    /// Require at least one test on a batch before selling a policy on it.
    pub require_prior_test: bool,
    /// Wall-clock limit in minutes; 0 means untimed.
    pub time_limit_minutes: u32,
    /// Extra-allowance pricing.
    pub shop: ShopConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Medium)
    }
}

impl SessionConfig {
    /// Session parameters suggested by a difficulty preset; scoring
    /// knobs at their deployment defaults.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let preset = difficulty.preset();
        let mut confidence_bonus = BTreeMap::new();
        confidence_bonus.insert("0.90".to_string(), 1.0);
        confidence_bonus.insert("0.95".to_string(), 1.25);
        confidence_bonus.insert("0.99".to_string(), 1.5);

        let mut miss_penalty = BTreeMap::new();
        miss_penalty.insert("0.90".to_string(), 200);
        miss_penalty.insert("0.95".to_string(), 350);
        miss_penalty.insert("0.99".to_string(), 600);

        Self {
            device_count: preset.device_count,
            max_turns: preset.max_turns,
            test_budget: preset.test_budget,
            min_n: preset.min_n,
            max_n: preset.max_n,
            premium_scale: 120,
            confidence_bonus,
            miss_penalty,
            require_prior_test: true,
            time_limit_minutes: 0,
            shop: ShopConfig::default(),
        }
    }

    /// Confidence level keys in display order.
    pub fn confidence_levels(&self) -> Vec<&str> {
        self.confidence_bonus.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_round_trip() {
        for d in Difficulty::ALL {
            assert_eq!(d.key().parse::<Difficulty>().unwrap(), d);
        }
        assert_eq!("  MEDIUM ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!(matches!(
            "brutal".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn test_presets_have_three_bands() {
        for d in Difficulty::ALL {
            let preset = d.preset();
            assert_eq!(preset.p_ranges.len(), 3);
            for &(lo, hi) in preset.p_ranges {
                assert!(0.0 <= lo && lo < hi && hi <= 1.0);
            }
            assert!(preset.min_n <= preset.max_n);
        }
    }

    #[test]
    fn test_config_defaults_follow_medium() {
        let config = SessionConfig::default();
        assert_eq!(config.device_count, 10);
        assert_eq!(config.max_turns, 20);
        assert_eq!(config.test_budget, 400);
        assert_eq!(config.premium_scale, 120);
        assert_eq!(config.time_limit_minutes, 0);
        assert_eq!(config.confidence_levels(), vec!["0.90", "0.95", "0.99"]);
        assert_eq!(config.miss_penalty["0.99"], 600);
    }
}

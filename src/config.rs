//! Caller-facing configuration surface consumed by the core.

use serde::{Deserialize, Serialize};

/// Run difficulty, affecting baseline drains, condition drains and risk
/// bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Standard,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Standard => "standard",
            Self::Hard => "hard",
        }
    }
}

/// Hint for how much optional low-impact content to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextDensity {
    Sparse,
    #[default]
    Standard,
    Rich,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Dampens beneficial resource deltas when set.
    #[serde(default)]
    pub scarcity: bool,
    #[serde(default)]
    pub text_density: TextDensity,
}

//! Score calculation and protection tiers.
//!
//! Pure functions only. Rounding uses [`f64::round`], which rounds
//! half-way cases away from zero (`-22.5` becomes `-23`).

use serde::Serialize;

use crate::catalog::Decision;
use crate::engine::DecisionRecord;

/// Score every session starts from.
pub const INITIAL_SCORE: i32 = 50;

/// Lowest reachable score.
pub const MIN_SCORE: i32 = 0;

/// Highest reachable score.
pub const MAX_SCORE: i32 = 100;

/// Extra penalty per consecutive exposed high-severity event beyond the first.
pub const COMPOUND_STEP: f64 = 0.25;

/// Outcome of applying one decision to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    /// Score after clamping
    pub new_score: i32,
    /// Delta actually applied (after compounding, before clamping)
    pub applied_delta: i32,
}

/// Clamps a score into `[0, 100]`.
#[must_use]
pub fn clamp_score(score: i32) -> i32 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Returns the penalty multiplier for the given exposed-high streak.
///
/// A streak of 0 or 1 yields `1.0`; each further step adds
/// [`COMPOUND_STEP`].
#[must_use]
pub fn compound_multiplier(streak: u32) -> f64 {
    if streak <= 1 {
        1.0
    } else {
        f64::from(streak - 1).mul_add(COMPOUND_STEP, 1.0)
    }
}

/// Applies `impact` to `current`, compounding the penalty when this is the
/// second or later consecutive exposed high-severity event.
///
/// `streak` must already include the current event.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn calculate_score(
    current: i32,
    impact: i32,
    is_exposed_high: bool,
    streak: u32,
) -> ScoreChange {
    let applied_delta = if is_exposed_high && streak > 1 {
        (f64::from(impact) * compound_multiplier(streak)).round() as i32
    } else {
        impact
    };

    ScoreChange {
        new_score: clamp_score(current.saturating_add(applied_delta)),
        applied_delta,
    }
}

/// Rounds and clamps a raw score for final reporting.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn normalize_score(raw: f64) -> i32 {
    if raw.is_nan() {
        return MIN_SCORE;
    }
    raw.round().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as i32
}

/// Coarse classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectionTier {
    /// `score <= 35`
    Low,
    /// `36 <= score <= 70`
    Medium,
    /// `score >= 71`
    High,
}

impl ProtectionTier {
    /// Upper bound (inclusive) of the low tier.
    pub const LOW_MAX: i32 = 35;

    /// Upper bound (inclusive) of the medium tier.
    pub const MEDIUM_MAX: i32 = 70;

    /// Classifies a score.
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score <= Self::LOW_MAX {
            Self::Low
        } else if score <= Self::MEDIUM_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Protection",
            Self::Medium => "Medium Protection",
            Self::High => "High Protection",
        }
    }

    /// Color token for presentation layers.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "#EF4444",
            Self::Medium => "#F59E0B",
            Self::High => "#10B981",
        }
    }

    /// Stable key (`LOW`, `MEDIUM`, `HIGH`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for ProtectionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One `"<stage>: <title> (<severity>)"` line per exposed decision,
/// in timeline order.
#[must_use]
pub fn risk_gaps(timeline: &[DecisionRecord]) -> Vec<String> {
    timeline
        .iter()
        .filter(|record| record.decision == Decision::Exposed)
        .map(|record| {
            format!(
                "{}: {} ({})",
                record.stage_label, record.title, record.severity
            )
        })
        .collect()
}

/// Text a player can share after the race.
#[must_use]
pub fn share_text(score: i32, tier: ProtectionTier) -> String {
    format!(
        "I scored {score}/100 ({}) on the Life Milestone Race! How protected are you?",
        tier.label()
    )
}

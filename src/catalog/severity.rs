//! Severity tiers and the base impact table.
//!
//! [`Severity::impact`] is the single source of truth for score deltas;
//! catalog events derive their impacts from it when constructed.

use serde::{Deserialize, Serialize};

/// The player's answer to a risk event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Covered against the risk.
    Protected,
    /// Not covered. Also the automatic answer when the countdown expires.
    Exposed,
}

impl Decision {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Exposed => "exposed",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protected" | "p" => Ok(Self::Protected),
            "exposed" | "e" => Ok(Self::Exposed),
            other => Err(format!("unknown decision '{other}'")),
        }
    }
}

/// Severity tier of a risk event.
///
/// Unrecognized tier names in a loaded catalog deserialize to
/// [`Severity::Unknown`], which carries zero impact so a bad catalog
/// entry can never wedge the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// +15 protected / -20 exposed; exposed streaks compound.
    High,
    /// +10 protected / -12 exposed.
    Medium,
    /// +5 protected / -8 exposed.
    Moderate,
    /// Any tier name the table does not know.
    #[serde(other)]
    Unknown,
}

/// Base score deltas for one severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Impact {
    /// Delta applied when the player is protected (positive).
    pub protected: i32,
    /// Delta applied when the player is exposed (negative).
    pub exposed: i32,
}

impl Severity {
    /// All known tiers, most severe first.
    pub const KNOWN: [Self; 3] = [Self::High, Self::Medium, Self::Moderate];

    /// Returns the base impacts for this tier.
    #[must_use]
    pub const fn impact(self) -> Impact {
        match self {
            Self::High => Impact {
                protected: 15,
                exposed: -20,
            },
            Self::Medium => Impact {
                protected: 10,
                exposed: -12,
            },
            Self::Moderate => Impact {
                protected: 5,
                exposed: -8,
            },
            Self::Unknown => Impact {
                protected: 0,
                exposed: 0,
            },
        }
    }

    /// Returns `true` for the tier whose exposed streaks compound.
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// Lowercase tier name, as used in risk-gap summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Moderate => "moderate",
            Self::Unknown => "unknown",
        }
    }

    /// Player-facing label for the tier.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::High => "Critical",
            Self::Medium => "Significant",
            Self::Moderate => "Moderate",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Evidence Strength
//!
//! Direction and strength-of-evidence category for a single attributed WOE
//! value, on the usual Jeffreys-style scale.

use serde::{Deserialize, Serialize};

use crate::constants::{WOE_DECISIVE, WOE_NEUTRAL, WOE_STRONG, WOE_SUBSTANTIAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceType {
    Positive,
    Negative,
    Zero,
}

impl EvidenceType {
    pub fn of(woe: f64) -> Self {
        if woe < 0.0 {
            EvidenceType::Negative
        } else if woe > 0.0 {
            EvidenceType::Positive
        } else {
            EvidenceType::Zero
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrengthOfEvidence {
    #[serde(rename = "Not worth mentioning")]
    NotWorthMentioning,
    Substantial,
    Strong,
    Decisive,
}

impl StrengthOfEvidence {
    /// Step function of |woe|: `[0, 1.15)`, `[1.15, 2.3]`, `(2.3, 4.61]`, above
    pub fn of(woe: f64) -> Self {
        let magnitude = woe.abs();
        if magnitude.is_nan() || magnitude < WOE_NEUTRAL {
            StrengthOfEvidence::NotWorthMentioning
        } else if magnitude <= WOE_SUBSTANTIAL {
            StrengthOfEvidence::Substantial
        } else if magnitude <= WOE_STRONG {
            StrengthOfEvidence::Strong
        } else {
            debug_assert!(magnitude <= WOE_DECISIVE);
            StrengthOfEvidence::Decisive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthOfEvidence::NotWorthMentioning => "Not worth mentioning",
            StrengthOfEvidence::Substantial => "Substantial",
            StrengthOfEvidence::Strong => "Strong",
            StrengthOfEvidence::Decisive => "Decisive",
        }
    }
}

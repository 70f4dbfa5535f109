//! WOE Module - Weight-of-Evidence explanations per diagnostic hypothesis

pub mod explainer;
pub mod strength;

pub use explainer::{WoeExplainer, WoeExplanation};
pub use strength::{EvidenceType, StrengthOfEvidence};

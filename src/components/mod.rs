//! Decision fusion components.
//!
//! The detectors and the classifier each produce an independent opinion about
//! a message. The [`decision_engine`] folds them into one [`Verdict`] by
//! walking an ordered cascade of rules, and the verdict keeps enough of the
//! evidence to explain which rule fired and why.

pub mod decision_engine;
pub mod verdict;

pub use decision_engine::{CascadeRule, DecisionConfig, DecisionEngine, FusionInput, RuleOutcome};
pub use verdict::{Verdict, WarningLevel};

//! Role based ability rules.
//!
//! The server derives a rule set from the user's role at login and hands it
//! to the client, which uses the same evaluator to decide what to show.

pub mod rule;
pub mod table;

pub use rule::{can_view, AbilityRule, AbilityRuleSet, Action, UnknownAction, SUBJECT_ALL};
pub use table::{rules_for, rules_for_name, Role, UnknownRole};

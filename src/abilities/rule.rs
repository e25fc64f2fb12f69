use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subject tag that, paired with `Action::Manage`, grants everything.
pub const SUBJECT_ALL: &str = "all";

/// Actions a rule can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "manage" => Ok(Action::Manage),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// A single (action, subject) permission pair.
///
/// Serialized as `{"action": "...", "subject": "..."}`, the shape clients
/// receive under `userAbilityRules`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityRule {
    pub action: Action,
    pub subject: String,
}

impl AbilityRule {
    pub fn new(action: Action, subject: impl Into<String>) -> Self {
        Self {
            action,
            subject: subject.into(),
        }
    }

    /// The `(manage, all)` rule
    pub fn wildcard() -> Self {
        Self::new(Action::Manage, SUBJECT_ALL)
    }

    pub fn is_wildcard(&self) -> bool {
        self.action == Action::Manage && self.subject == SUBJECT_ALL
    }
}

impl fmt::Display for AbilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.subject)
    }
}

/// The rules granted to one role.
///
/// Order carries no meaning: evaluation is set membership with the wildcard
/// checked first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityRuleSet(Vec<AbilityRule>);

impl AbilityRuleSet {
    pub fn new(rules: Vec<AbilityRule>) -> Self {
        Self(rules)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Decide whether `action` on `subject` is allowed.
    ///
    /// `(manage, all)` dominates every other rule. Otherwise the pair must be
    /// present exactly; `manage Lead` does not imply `read Lead`.
    pub fn can(&self, action: Action, subject: &str) -> bool {
        if self.is_wildcard() {
            return true;
        }
        self.0
            .iter()
            .any(|rule| rule.action == action && rule.subject == subject)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.iter().any(AbilityRule::is_wildcard)
    }

    pub fn contains(&self, rule: &AbilityRule) -> bool {
        self.0.contains(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<AbilityRule> {
        self.0
    }
}

impl FromIterator<AbilityRule> for AbilityRuleSet {
    fn from_iter<I: IntoIterator<Item = AbilityRule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Visibility check for navigation entries and route metadata.
///
/// An entry that declares no action or no subject is unrestricted. This is a
/// presentation rule only; endpoints enforce access on their own.
pub fn can_view(rules: &AbilityRuleSet, action: Option<Action>, subject: Option<&str>) -> bool {
    match (action, subject) {
        (Some(action), Some(subject)) => rules.can(action, subject),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_allows_anything() {
        let rules = AbilityRuleSet::new(vec![AbilityRule::wildcard()]);
        assert!(rules.can(Action::Delete, "Royalty"));
        assert!(rules.can(Action::Create, "SomethingNobodyDeclared"));
    }

    #[test]
    fn wildcard_dominates_regardless_of_position() {
        let rules = AbilityRuleSet::new(vec![
            AbilityRule::new(Action::Read, "Lead"),
            AbilityRule::wildcard(),
        ]);
        assert!(rules.can(Action::Update, "Unit"));
    }

    #[test]
    fn exact_match_only() {
        let rules = AbilityRuleSet::new(vec![AbilityRule::new(Action::Manage, "Lead")]);
        assert!(rules.can(Action::Manage, "Lead"));
        assert!(!rules.can(Action::Read, "Lead"));
        assert!(!rules.can(Action::Manage, "lead"));
        assert!(!rules.can(Action::Manage, SUBJECT_ALL));
    }

    #[test]
    fn manage_on_other_subject_is_not_wildcard() {
        let rules = AbilityRuleSet::new(vec![AbilityRule::new(Action::Read, SUBJECT_ALL)]);
        assert!(!rules.is_wildcard());
        assert!(!rules.can(Action::Read, "Lead"));
    }

    #[test]
    fn empty_set_denies() {
        let rules = AbilityRuleSet::empty();
        assert!(!rules.can(Action::Read, "Lead"));
        assert!(!rules.can(Action::Manage, SUBJECT_ALL));
    }

    #[test]
    fn can_view_without_permission_is_unrestricted() {
        let rules = AbilityRuleSet::empty();
        assert!(can_view(&rules, None, None));
        assert!(can_view(&rules, Some(Action::Read), None));
        assert!(can_view(&rules, None, Some("Lead")));
        assert!(!can_view(&rules, Some(Action::Read), Some("Lead")));
    }

    #[test]
    fn wire_shape() {
        let rules = AbilityRuleSet::new(vec![AbilityRule::new(Action::Create, "TechnicalRequest")]);
        let value = serde_json::to_value(&rules).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "action": "create", "subject": "TechnicalRequest" }])
        );

        let parsed: AbilityRuleSet = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn action_parses_lowercase_names() {
        assert_eq!("manage".parse::<Action>(), Ok(Action::Manage));
        assert!("Manage".parse::<Action>().is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rule::{AbilityRule, AbilityRuleSet, Action};

/// User roles known to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Franchisor,
    Franchisee,
    Sales,
    Broker,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Franchisor,
        Role::Franchisee,
        Role::Sales,
        Role::Broker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Franchisor => "franchisor",
            Role::Franchisee => "franchisee",
            Role::Sales => "sales",
            Role::Broker => "broker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "franchisor" => Ok(Role::Franchisor),
            "franchisee" => Ok(Role::Franchisee),
            "sales" => Ok(Role::Sales),
            "broker" => Ok(Role::Broker),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Ability rules granted to `role`.
///
/// This table is the only place rules are defined. Clients receive a copy at
/// login and must not add to it.
pub fn rules_for(role: Role) -> AbilityRuleSet {
    use Action::*;

    let rules: &[(Action, &str)] = match role {
        Role::Admin => &[(Manage, "all")],
        Role::Franchisor => &[
            (Manage, "Franchise"),
            (Manage, "Unit"),
            (Manage, "Lead"),
            (Manage, "Royalty"),
            (Manage, "TechnicalRequest"),
            (Manage, "Note"),
            (Manage, "Task"),
            (Read, "MarketplaceListing"),
        ],
        Role::Franchisee => &[
            (Read, "Franchise"),
            (Read, "Unit"),
            (Update, "Unit"),
            (Read, "Royalty"),
            (Create, "TechnicalRequest"),
            (Read, "TechnicalRequest"),
            (Manage, "Task"),
            (Manage, "Note"),
        ],
        Role::Sales => &[
            (Manage, "Lead"),
            (Read, "Task"),
            (Create, "TechnicalRequest"),
        ],
        Role::Broker => &[
            (Manage, "MarketplaceListing"),
            (Read, "Franchise"),
            (Read, "Lead"),
        ],
    };

    rules
        .iter()
        .map(|(action, subject)| AbilityRule::new(*action, *subject))
        .collect()
}

/// Same as [`rules_for`] but keyed by the stored role name.
///
/// Unknown names get an empty set, which denies everything.
pub fn rules_for_name(name: &str) -> AbilityRuleSet {
    match name.parse::<Role>() {
        Ok(role) => rules_for(role),
        Err(_) => {
            tracing::warn!("No ability rules for unknown role '{}'", name);
            AbilityRuleSet::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ACTIONS: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    const SUBJECTS: [&str; 10] = [
        "all",
        "Franchise",
        "Unit",
        "Lead",
        "Royalty",
        "TechnicalRequest",
        "Note",
        "Task",
        "MarketplaceListing",
        "User",
    ];

    #[test]
    fn admin_is_wildcard() {
        let rules = rules_for(Role::Admin);
        assert!(rules.is_wildcard());
        for action in ACTIONS {
            for subject in SUBJECTS {
                assert!(rules.can(action, subject));
            }
        }
    }

    #[test]
    fn non_wildcard_roles_allow_exactly_their_rules() {
        for role in Role::ALL {
            let rules = rules_for(role);
            if rules.is_wildcard() {
                continue;
            }
            for action in ACTIONS {
                for subject in SUBJECTS {
                    let expected = rules.contains(&AbilityRule::new(action, subject));
                    assert_eq!(
                        rules.can(action, subject),
                        expected,
                        "{} {} {}",
                        role,
                        action,
                        subject
                    );
                }
            }
        }
    }

    #[test]
    fn sales_rules_literal() {
        let actual: HashSet<AbilityRule> = rules_for(Role::Sales).into_inner().into_iter().collect();
        let expected: HashSet<AbilityRule> = [
            AbilityRule::new(Action::Manage, "Lead"),
            AbilityRule::new(Action::Read, "Task"),
            AbilityRule::new(Action::Create, "TechnicalRequest"),
        ]
        .into_iter()
        .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn unknown_role_name_denies_everything() {
        let rules = rules_for_name("janitor");
        assert!(rules.is_empty());
        for action in ACTIONS {
            for subject in SUBJECTS {
                assert!(!rules.can(action, subject));
            }
        }
    }

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
            assert_eq!(rules_for_name(role.as_str()), rules_for(role));
        }
    }
}

use crate::abilities::{can_view, AbilityRuleSet, Action};

use super::storage::KeyValueStore;

/// Storage key shared with the web client
pub const ABILITY_RULES_KEY: &str = "userAbilityRules";

/// The client's copy of the rules received at login.
///
/// The cache is only ever replaced wholesale from a login response or cleared
/// on logout. It is handed explicitly to navigation and route checks.
pub struct AbilityCache<S: KeyValueStore> {
    store: S,
    rules: AbilityRuleSet,
}

impl<S: KeyValueStore> AbilityCache<S> {
    /// Restore whatever a previous session persisted; unreadable data counts as no rules
    pub fn load(store: S) -> Self {
        let rules = match store.get(ABILITY_RULES_KEY) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable {}: {}", ABILITY_RULES_KEY, e);
                AbilityRuleSet::empty()
            }),
            Ok(None) => AbilityRuleSet::empty(),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", ABILITY_RULES_KEY, e);
                AbilityRuleSet::empty()
            }
        };

        Self { store, rules }
    }

    pub fn rules(&self) -> &AbilityRuleSet {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrite the cached rules and persist them
    pub fn replace(&mut self, rules: AbilityRuleSet) -> anyhow::Result<()> {
        self.store
            .set(ABILITY_RULES_KEY, serde_json::to_value(&rules)?)?;
        self.rules = rules;
        Ok(())
    }

    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.store.remove(ABILITY_RULES_KEY)?;
        self.rules = AbilityRuleSet::empty();
        Ok(())
    }

    pub fn can(&self, action: Action, subject: &str) -> bool {
        self.rules.can(action, subject)
    }

    pub fn can_view(&self, action: Option<Action>, subject: Option<&str>) -> bool {
        can_view(&self.rules, action, subject)
    }
}

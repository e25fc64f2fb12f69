use serde::{Deserialize, Serialize};

use crate::abilities::{Action, AbilityRuleSet};

use super::ability_cache::AbilityCache;
use super::storage::KeyValueStore;

/// One entry of the vertical menu. Entries without `action`/`subject` are unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    pub fn link(title: &str, to: &str, icon: &str) -> Self {
        Self {
            title: title.to_string(),
            to: Some(to.to_string()),
            icon: Some(icon.to_string()),
            action: None,
            subject: None,
            children: Vec::new(),
        }
    }

    pub fn group(title: &str, icon: &str, children: Vec<NavItem>) -> Self {
        Self {
            title: title.to_string(),
            to: None,
            icon: Some(icon.to_string()),
            action: None,
            subject: None,
            children,
        }
    }

    pub fn requires(mut self, action: Action, subject: &str) -> Self {
        self.action = Some(action);
        self.subject = Some(subject.to_string());
        self
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

pub fn default_menu() -> Vec<NavItem> {
    vec![
        NavItem::link("Dashboard", "/", "tabler-smart-home"),
        NavItem::group(
            "Franchisor",
            "tabler-building-store",
            vec![
                NavItem::link("Franchise Registration", "/franchisor/franchise-registration", "tabler-file-plus")
                    .requires(Action::Manage, "Franchise"),
                NavItem::link("Units", "/franchisor/units", "tabler-building")
                    .requires(Action::Manage, "Unit"),
                NavItem::link("Royalty Management", "/franchisor/royalty-management", "tabler-coin")
                    .requires(Action::Manage, "Royalty"),
                NavItem::link("Technical Requests", "/franchisor/technical-requests", "tabler-tool")
                    .requires(Action::Manage, "TechnicalRequest"),
            ],
        ),
        NavItem::group(
            "Franchisee",
            "tabler-home-2",
            vec![
                NavItem::link("My Unit", "/franchisee/my-unit", "tabler-building")
                    .requires(Action::Read, "Unit"),
                NavItem::link("Royalties", "/franchisee/royalties", "tabler-coin")
                    .requires(Action::Read, "Royalty"),
                NavItem::link("Technical Requests", "/franchisee/technical-requests", "tabler-tool")
                    .requires(Action::Create, "TechnicalRequest"),
            ],
        ),
        NavItem::link("Leads", "/sales/leads", "tabler-users").requires(Action::Manage, "Lead"),
        NavItem::link("Tasks", "/franchisee/my-tasks", "tabler-checklist").requires(Action::Manage, "Task"),
        NavItem::link("Notes", "/notes", "tabler-notes").requires(Action::Manage, "Note"),
        NavItem::link("Marketplace", "/broker/listings", "tabler-building-community")
            .requires(Action::Manage, "MarketplaceListing"),
        NavItem::link("Users", "/admin/users", "tabler-user-cog").requires(Action::Manage, "User"),
    ]
}

/// Items the rules allow, groups filtered recursively
pub fn visible_items<S: KeyValueStore>(cache: &AbilityCache<S>, items: &[NavItem]) -> Vec<NavItem> {
    filter_items(cache.rules(), items)
}

pub fn filter_items(rules: &AbilityRuleSet, items: &[NavItem]) -> Vec<NavItem> {
    items
        .iter()
        .filter_map(|item| {
            if !crate::abilities::can_view(rules, item.action, item.subject.as_deref()) {
                return None;
            }
            if !item.is_group() {
                return Some(item.clone());
            }

            let children = filter_items(rules, &item.children);
            if children.is_empty() {
                return None;
            }
            Some(NavItem {
                children,
                ..item.clone()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{rules_for, Role};

    fn titles(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn admin_sees_everything() {
        let menu = default_menu();
        let visible = filter_items(&rules_for(Role::Admin), &menu);
        assert_eq!(visible, menu);
    }

    #[test]
    fn sales_menu() {
        let visible = filter_items(&rules_for(Role::Sales), &default_menu());
        assert_eq!(titles(&visible), vec!["Dashboard", "Franchisee", "Leads"]);

        let group = visible.iter().find(|i| i.title == "Franchisee").unwrap();
        assert_eq!(titles(&group.children), vec!["Technical Requests"]);
    }

    #[test]
    fn franchisee_group_keeps_only_permitted_children() {
        let visible = filter_items(&rules_for(Role::Franchisee), &default_menu());
        assert_eq!(
            titles(&visible),
            vec!["Dashboard", "Franchisee", "Tasks", "Notes"]
        );

        let group = visible.iter().find(|i| i.title == "Franchisee").unwrap();
        assert_eq!(
            titles(&group.children),
            vec!["My Unit", "Royalties", "Technical Requests"]
        );
    }

    #[test]
    fn empty_rules_leave_only_unrestricted_items() {
        let visible = filter_items(&AbilityRuleSet::empty(), &default_menu());
        assert_eq!(titles(&visible), vec!["Dashboard"]);
    }

    #[test]
    fn broker_sees_marketplace() {
        let visible = filter_items(&rules_for(Role::Broker), &default_menu());
        assert_eq!(titles(&visible), vec!["Dashboard", "Marketplace"]);
    }
}

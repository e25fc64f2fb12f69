use serde::{Deserialize, Serialize};

use crate::abilities::Action;

use super::ability_cache::AbilityCache;
use super::storage::KeyValueStore;

/// Access requirements attached to a client route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMeta {
    pub action: Option<Action>,
    pub subject: Option<String>,
    /// Only for visitors who are not logged in, e.g. `/login`
    #[serde(default)]
    pub public: bool,
}

impl RouteMeta {
    pub fn public() -> Self {
        Self {
            public: true,
            ..Self::default()
        }
    }

    pub fn requires(action: Action, subject: &str) -> Self {
        Self {
            action: Some(action),
            subject: Some(subject.to_string()),
            public: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Proceed,
    RedirectToLogin,
    NotAuthorized,
    RedirectHome,
}

pub fn guard<S: KeyValueStore>(meta: &RouteMeta, logged_in: bool, cache: &AbilityCache<S>) -> RouteDecision {
    if meta.public {
        return if logged_in {
            RouteDecision::RedirectHome
        } else {
            RouteDecision::Proceed
        };
    }

    if cache.can_view(meta.action, meta.subject.as_deref()) {
        return RouteDecision::Proceed;
    }

    if logged_in {
        RouteDecision::NotAuthorized
    } else {
        RouteDecision::RedirectToLogin
    }
}

//! Onboarding and franchise registration gates.
//!
//! Gates run in order before business handlers. Each one looks at the
//! requesting user's registration state, freshly loaded for this request, and
//! either lets the request through or names the page the user has to finish
//! first. Gates decide; rendering the decision is the middleware's job.
use axum::http::Method;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::abilities::Role;
use crate::config::GateConfig;

/// Registration state of the requesting user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSubject {
    pub user_id: Uuid,
    pub role: Option<Role>,
    pub profile_completed: bool,
    pub has_franchise: bool,
}

#[derive(Debug, Clone)]
pub struct GateRequest {
    /// `None` for unauthenticated requests
    pub subject: Option<GateSubject>,
    pub path: String,
    pub method: Method,
}

impl GateRequest {
    pub fn new(subject: Option<GateSubject>, method: Method, path: impl Into<String>) -> Self {
        Self {
            subject,
            path: path.into(),
            method,
        }
    }

    /// Path with any `/api` prefix and trailing slash removed
    pub fn normalized_path(&self) -> &str {
        normalize_path(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTarget {
    Onboarding { path: String },
    FranchiseRegistration { path: String },
}

impl RedirectTarget {
    pub fn path(&self) -> &str {
        match self {
            RedirectTarget::Onboarding { path } => path,
            RedirectTarget::FranchiseRegistration { path } => path,
        }
    }

    /// Machine-readable flag set to `true` in JSON responses
    pub fn flag(&self) -> &'static str {
        match self {
            RedirectTarget::Onboarding { .. } => "requires_onboarding",
            RedirectTarget::FranchiseRegistration { .. } => "requires_franchise_registration",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RedirectTarget::Onboarding { .. } => {
                "Please complete your onboarding profile before continuing."
            }
            RedirectTarget::FranchiseRegistration { .. } => {
                "Please register your franchise before continuing."
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RedirectTarget::Onboarding { .. } => "ONBOARDING_REQUIRED",
            RedirectTarget::FranchiseRegistration { .. } => "FRANCHISE_REGISTRATION_REQUIRED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectRequired(RedirectTarget),
}

impl GateDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// One request predicate in the gate chain
pub trait Gate: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, request: &GateRequest) -> GateDecision;
}

/// Franchisees must complete their profile before anything else
pub struct OnboardingGate {
    redirect_to: String,
    bypass: Vec<String>,
}

impl OnboardingGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            redirect_to: config.onboarding_path.clone(),
            bypass: config.franchisee_bypass_paths.clone(),
        }
    }
}

impl Gate for OnboardingGate {
    fn name(&self) -> &'static str {
        "onboarding"
    }

    fn evaluate(&self, request: &GateRequest) -> GateDecision {
        let Some(subject) = &request.subject else {
            return GateDecision::Allow;
        };
        if subject.role != Some(Role::Franchisee) || subject.profile_completed {
            return GateDecision::Allow;
        }

        let path = request.normalized_path();
        if self.bypass.iter().any(|allowed| allowed == path) {
            return GateDecision::Allow;
        }

        GateDecision::RedirectRequired(RedirectTarget::Onboarding {
            path: self.redirect_to.clone(),
        })
    }
}

/// Franchisors must own a franchise before anything else
pub struct FranchiseRegistrationGate {
    redirect_to: String,
    bypass: Vec<String>,
    marker: String,
    creation_paths: Vec<String>,
}

impl FranchiseRegistrationGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            redirect_to: config.franchise_registration_path.clone(),
            bypass: config.franchisor_bypass_paths.clone(),
            marker: config.franchise_registration_marker.clone(),
            creation_paths: config.franchise_creation_paths.clone(),
        }
    }

    fn is_bypassed(&self, request: &GateRequest) -> bool {
        let path = request.normalized_path();

        if self.bypass.iter().any(|allowed| allowed == path) {
            return true;
        }
        if !self.marker.is_empty() && path.contains(&self.marker) {
            return true;
        }
        request.method == Method::POST && self.creation_paths.iter().any(|p| p == path)
    }
}

impl Gate for FranchiseRegistrationGate {
    fn name(&self) -> &'static str {
        "franchise_registration"
    }

    fn evaluate(&self, request: &GateRequest) -> GateDecision {
        let Some(subject) = &request.subject else {
            return GateDecision::Allow;
        };
        if subject.role != Some(Role::Franchisor) || subject.has_franchise {
            return GateDecision::Allow;
        }
        if self.is_bypassed(request) {
            return GateDecision::Allow;
        }

        GateDecision::RedirectRequired(RedirectTarget::FranchiseRegistration {
            path: self.redirect_to.clone(),
        })
    }
}

/// Ordered gates; the first one that does not allow decides
#[derive(Clone, Default)]
pub struct GateChain {
    gates: Vec<Arc<dyn Gate>>,
}

impl GateChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The onboarding gate followed by the franchise registration gate
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new()
            .with(OnboardingGate::new(config))
            .with(FranchiseRegistrationGate::new(config))
    }

    pub fn with(mut self, gate: impl Gate + 'static) -> Self {
        self.gates.push(Arc::new(gate));
        self
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn evaluate(&self, request: &GateRequest) -> GateDecision {
        for gate in &self.gates {
            let decision = gate.evaluate(request);
            if !decision.is_allow() {
                tracing::debug!(
                    "Gate '{}' redirected {} {}",
                    gate.name(),
                    request.method,
                    request.path
                );
                return decision;
            }
        }
        GateDecision::Allow
    }
}

pub fn normalize_path(path: &str) -> &str {
    let path = match path.strip_prefix("/api") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(role: Role, profile_completed: bool, has_franchise: bool) -> GateSubject {
        GateSubject {
            user_id: Uuid::new_v4(),
            role: Some(role),
            profile_completed,
            has_franchise,
        }
    }

    fn chain() -> GateChain {
        GateChain::from_config(&GateConfig::default())
    }

    fn get(subject: GateSubject, path: &str) -> GateRequest {
        GateRequest::new(Some(subject), Method::GET, path)
    }

    #[test]
    fn unauthenticated_requests_pass() {
        let request = GateRequest::new(None, Method::GET, "/franchisee/my-tasks");
        assert_eq!(chain().evaluate(&request), GateDecision::Allow);
    }

    #[test]
    fn ungated_roles_pass() {
        for role in [Role::Admin, Role::Sales, Role::Broker] {
            let request = get(subject(role, false, false), "/franchisee/my-tasks");
            assert_eq!(chain().evaluate(&request), GateDecision::Allow);
        }
    }

    #[test]
    fn unknown_role_passes() {
        let mut s = subject(Role::Sales, false, false);
        s.role = None;
        assert!(chain().evaluate(&get(s, "/anything")).is_allow());
    }

    #[test]
    fn incomplete_franchisee_is_sent_to_onboarding() {
        let request = get(subject(Role::Franchisee, false, false), "/franchisee/my-tasks");
        match chain().evaluate(&request) {
            GateDecision::RedirectRequired(target) => {
                assert_eq!(target.path(), "/onboarding");
                assert_eq!(target.flag(), "requires_onboarding");
            }
            GateDecision::Allow => panic!("expected redirect"),
        }
    }

    #[test]
    fn onboarding_endpoints_bypass_the_gate() {
        for path in [
            "/onboarding/status",
            "/api/onboarding/status",
            "/onboarding/complete/",
            "/auth/logout",
        ] {
            let request = get(subject(Role::Franchisee, false, false), path);
            assert!(chain().evaluate(&request).is_allow(), "{path}");
        }
    }

    #[test]
    fn completed_franchisee_passes() {
        let request = get(subject(Role::Franchisee, true, false), "/franchisee/my-tasks");
        assert!(chain().evaluate(&request).is_allow());
    }

    #[test]
    fn franchisor_without_franchise_is_sent_to_registration() {
        let request = get(subject(Role::Franchisor, false, false), "/franchisor/royalty-management");
        match chain().evaluate(&request) {
            GateDecision::RedirectRequired(target) => {
                assert_eq!(target.path(), "/franchisor/franchise-registration");
                assert_eq!(target.flag(), "requires_franchise_registration");
            }
            GateDecision::Allow => panic!("expected redirect"),
        }
    }

    #[test]
    fn franchisor_registration_paths_bypass() {
        let s = subject(Role::Franchisor, false, false);
        assert!(chain()
            .evaluate(&get(s.clone(), "/franchisor/franchise-registration"))
            .is_allow());
        assert!(chain()
            .evaluate(&get(s.clone(), "/api/franchisor/franchise-registration/step-2"))
            .is_allow());
        assert!(chain().evaluate(&get(s, "/auth/user")).is_allow());
    }

    #[test]
    fn only_post_to_creation_path_bypasses() {
        let s = subject(Role::Franchisor, false, false);
        let post = GateRequest::new(Some(s.clone()), Method::POST, "/franchisor/franchises");
        assert!(chain().evaluate(&post).is_allow());

        let api_post = GateRequest::new(Some(s.clone()), Method::POST, "/api/franchises");
        assert!(chain().evaluate(&api_post).is_allow());

        let get_list = GateRequest::new(Some(s), Method::GET, "/franchisor/franchises");
        assert!(!chain().evaluate(&get_list).is_allow());
    }

    #[test]
    fn franchisor_with_franchise_passes() {
        let request = get(subject(Role::Franchisor, false, true), "/franchisor/royalty-management");
        assert!(chain().evaluate(&request).is_allow());
    }

    #[test]
    fn empty_chain_allows() {
        let request = get(subject(Role::Franchisee, false, false), "/franchisee/my-tasks");
        assert!(GateChain::new().evaluate(&request).is_allow());
    }

    #[test]
    fn first_redirect_wins() {
        struct Deny;
        impl Gate for Deny {
            fn name(&self) -> &'static str {
                "deny"
            }
            fn evaluate(&self, _: &GateRequest) -> GateDecision {
                GateDecision::RedirectRequired(RedirectTarget::Onboarding {
                    path: "/first".to_string(),
                })
            }
        }

        let chain = GateChain::new().with(Deny).with(OnboardingGate::new(&GateConfig::default()));
        let request = get(subject(Role::Sales, true, true), "/x");
        match chain.evaluate(&request) {
            GateDecision::RedirectRequired(target) => assert_eq!(target.path(), "/first"),
            GateDecision::Allow => panic!("expected redirect"),
        }
    }

    #[test]
    fn path_normalization() {
        assert_eq!(normalize_path("/api/onboarding/status/"), "/onboarding/status");
        assert_eq!(normalize_path("/apiary"), "/apiary");
        assert_eq!(normalize_path("/api"), "/");
        assert_eq!(normalize_path("/"), "/");
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::abilities::Role;
use crate::database::models::{Franchise, OnboardingProfile, User};
use crate::database::{StoreError, UserStore};
use crate::gate::GateSubject;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("validation failed")]
    Validation(HashMap<String, String>),

    #[error("user not found")]
    UserNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => RegistrationError::Conflict(msg),
            StoreError::NotFound(_) => RegistrationError::UserNotFound,
            other => RegistrationError::Store(other),
        }
    }
}

/// Onboarding and franchise registration state for gated roles
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn UserStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn user(&self, user_id: Uuid) -> Result<User, RegistrationError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or(RegistrationError::UserNotFound)
    }

    /// Load what the gates need, straight from the store
    pub async fn gate_subject(&self, user_id: Uuid) -> Result<Option<GateSubject>, RegistrationError> {
        let Some(user) = self.store.find_user_by_id(user_id).await? else {
            return Ok(None);
        };

        let role = user.role();
        let has_franchise = match role {
            Some(Role::Franchisor) => self.store.franchise_for_owner(user.id).await?.is_some(),
            _ => false,
        };

        Ok(Some(GateSubject {
            user_id: user.id,
            role,
            profile_completed: user.profile_completed,
            has_franchise,
        }))
    }

    pub async fn complete_onboarding(
        &self,
        user_id: Uuid,
        profile: &OnboardingProfile,
    ) -> Result<(), RegistrationError> {
        validate_profile(profile)?;
        self.store.complete_profile(user_id, profile).await?;
        info!("User {} completed onboarding", user_id);
        Ok(())
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Option<OnboardingProfile>, RegistrationError> {
        Ok(self.store.find_profile(user_id).await?)
    }

    pub async fn franchise_for(&self, franchisor_id: Uuid) -> Result<Option<Franchise>, RegistrationError> {
        Ok(self.store.franchise_for_owner(franchisor_id).await?)
    }

    pub async fn register_franchise(
        &self,
        franchisor_id: Uuid,
        name: &str,
    ) -> Result<Franchise, RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            let mut field_errors = HashMap::new();
            field_errors.insert("name".to_string(), "This field is required".to_string());
            return Err(RegistrationError::Validation(field_errors));
        }

        let franchise = self
            .store
            .create_franchise(Franchise::new(franchisor_id, name))
            .await?;
        info!("Franchisor {} registered franchise {}", franchisor_id, franchise.id);
        Ok(franchise)
    }
}

fn validate_profile(profile: &OnboardingProfile) -> Result<(), RegistrationError> {
    let fields = [
        ("phone", &profile.phone),
        ("address", &profile.address),
        ("city", &profile.city),
        ("state", &profile.state),
        ("zip", &profile.zip),
    ];

    let field_errors: HashMap<String, String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| (field.to_string(), "This field is required".to_string()))
        .collect();

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(RegistrationError::Validation(field_errors))
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Franchise {
    pub id: Uuid,
    pub franchisor_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Franchise {
    pub fn new(franchisor_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            franchisor_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Fields a franchisee supplies to finish onboarding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingProfile {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

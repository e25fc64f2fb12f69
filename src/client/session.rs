use serde_json::Value;

use crate::api::LoginResponse;
use crate::database::models::UserSummary;

use super::ability_cache::AbilityCache;
use super::storage::KeyValueStore;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const USER_DATA_KEY: &str = "userData";

/// Token, user and ability rules kept by a client between runs
pub struct ClientSession<S: KeyValueStore + Clone> {
    store: S,
    abilities: AbilityCache<S>,
}

impl<S: KeyValueStore + Clone> ClientSession<S> {
    pub fn load(store: S) -> Self {
        let abilities = AbilityCache::load(store.clone());
        Self { store, abilities }
    }

    pub fn abilities(&self) -> &AbilityCache<S> {
        &self.abilities
    }

    pub fn access_token(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .store
            .get(ACCESS_TOKEN_KEY)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    pub fn user(&self) -> anyhow::Result<Option<UserSummary>> {
        match self.store.get(USER_DATA_KEY)? {
            Some(value) => Ok(serde_json::from_value(value).ok()),
            None => Ok(None),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    /// Replace token, user and rules with the contents of a login response
    pub fn apply_login(&mut self, response: LoginResponse) -> anyhow::Result<()> {
        self.store
            .set(ACCESS_TOKEN_KEY, Value::String(response.token))?;
        self.store
            .set(USER_DATA_KEY, serde_json::to_value(&response.user_data)?)?;
        self.abilities.replace(response.user_ability_rules)?;
        Ok(())
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(USER_DATA_KEY)?;
        self.abilities.clear()
    }
}

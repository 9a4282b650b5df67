// In memory identity provider: a fixed table from bearer credential to acting user.

use crate::core::ports::{IdentityError, IdentityProvider};
use crate::core::reference::Actor;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    credentials: RwLock<HashMap<String, Actor>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, credential: impl Into<String>, actor: Actor) {
        self.credentials
            .write()
            .await
            .insert(credential.into(), actor);
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn resolve(&self, credential: &str) -> Result<Option<Actor>, IdentityError> {
        Ok(self.credentials.read().await.get(credential).cloned())
    }
}

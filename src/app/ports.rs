use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContactRecord, RegistryRecord};

/// Corporate registry lookup for a franchise in a given state
#[async_trait]
pub trait RegistryLookupPort: Send + Sync {
    async fn lookup(&self, franchise_name: &str, state_abbr: &str) -> Result<RegistryRecord>;
}

/// Contact lookup for a franchise location and its owner
#[async_trait]
pub trait ContactLookupPort: Send + Sync {
    async fn lookup(
        &self,
        franchise_name: &str,
        locality: &str,
        owner_name: &str,
    ) -> Result<ContactRecord>;
}

use serde::{Deserialize, Serialize};

use crate::constants::{
    FALLBACK_EMAIL, FALLBACK_LINKEDIN, FALLBACK_PHONE, FALLBACK_SOURCE_URL, NOT_AVAILABLE,
};
use crate::enrichment::SourceUrls;

/// Corporate identity data returned by the registry lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub corporate_name: String,
    pub registered_address: String,
    pub owner_name: String,
    pub source_url: String,
}

impl RegistryRecord {
    /// Record substituted when the registry lookup fails
    pub fn sentinel() -> Self {
        Self {
            corporate_name: NOT_AVAILABLE.to_string(),
            registered_address: NOT_AVAILABLE.to_string(),
            owner_name: NOT_AVAILABLE.to_string(),
            source_url: String::new(),
        }
    }
}

/// Contact data returned by the contact lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub phone: String,
    pub email: String,
    pub linkedin_url: String,
    pub source_urls: Vec<String>,
}

impl ContactRecord {
    /// Record substituted when the contact lookup itself errors
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Known defaults the contact lookup substitutes when it finds nothing usable.
///
/// The same values are excluded from confidence scoring for the contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFallback {
    pub phone: String,
    pub email: String,
    pub linkedin_url: String,
    pub source_urls: Vec<String>,
}

impl Default for ContactFallback {
    fn default() -> Self {
        Self {
            phone: FALLBACK_PHONE.to_string(),
            email: FALLBACK_EMAIL.to_string(),
            linkedin_url: FALLBACK_LINKEDIN.to_string(),
            source_urls: vec![FALLBACK_SOURCE_URL.to_string()],
        }
    }
}

impl ContactFallback {
    /// Values that do not count as informative for the contact field group
    pub fn exclusion_pool(&self) -> [&str; 3] {
        [self.phone.as_str(), self.email.as_str(), self.linkedin_url.as_str()]
    }
}

/// One franchise row after enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FranchiseRecord {
    pub name: String,
    pub state: String,
    pub corporate_name: String,
    pub corporate_address: String,
    pub owner_name: String,
    pub corporate_phone: String,
    pub corporate_email: String,
    pub linkedin_url: String,
    pub source_urls: SourceUrls,
    pub confidence: f64,
}

impl FranchiseRecord {
    pub fn new(name: &str, state: &str, source_urls: SourceUrls) -> Self {
        Self {
            name: name.to_string(),
            state: state.to_string(),
            corporate_name: NOT_AVAILABLE.to_string(),
            corporate_address: NOT_AVAILABLE.to_string(),
            owner_name: NOT_AVAILABLE.to_string(),
            corporate_phone: String::new(),
            corporate_email: String::new(),
            linkedin_url: String::new(),
            source_urls,
            confidence: 0.0,
        }
    }

    pub fn apply_registry(&mut self, registry: RegistryRecord) {
        self.corporate_name = registry.corporate_name;
        self.corporate_address = registry.registered_address;
        self.owner_name = registry.owner_name;
        self.source_urls.insert(registry.source_url);
    }

    pub fn apply_contact(&mut self, contact: ContactRecord) {
        self.corporate_phone = contact.phone;
        self.corporate_email = contact.email;
        self.linkedin_url = contact.linkedin_url;
        self.source_urls.extend(contact.source_urls);
    }

    pub fn registry_fields(&self) -> [&str; 3] {
        [
            self.corporate_name.as_str(),
            self.corporate_address.as_str(),
            self.owner_name.as_str(),
        ]
    }

    pub fn contact_fields(&self) -> [&str; 3] {
        [
            self.corporate_phone.as_str(),
            self.corporate_email.as_str(),
            self.linkedin_url.as_str(),
        ]
    }
}

//! Per-row enrichment: registry lookup, then contact lookup, then confidence scoring.

pub mod confidence;
pub mod sources;

pub use confidence::{confidence_score, is_informative, SCORED_FIELD_COUNT};
pub use sources::SourceUrls;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::ports::{ContactLookupPort, RegistryLookupPort};
use crate::observability::metrics;
use crate::types::{ContactFallback, ContactRecord, FranchiseRecord, RegistryRecord};

/// Enriches one franchise row at a time. Holds no per-row state.
pub struct RowEnricher {
    registry: Arc<dyn RegistryLookupPort>,
    contact: Arc<dyn ContactLookupPort>,
    fallback: ContactFallback,
}

impl RowEnricher {
    pub fn new(
        registry: Arc<dyn RegistryLookupPort>,
        contact: Arc<dyn ContactLookupPort>,
        fallback: ContactFallback,
    ) -> Self {
        Self {
            registry,
            contact,
            fallback,
        }
    }

    /// Enrich a single franchise. Collaborator failures are replaced with sentinel data and
    /// never returned to the caller.
    pub async fn enrich_row(
        &self,
        name: &str,
        state: &str,
        existing_source_urls: SourceUrls,
    ) -> FranchiseRecord {
        let mut record = FranchiseRecord::new(name, state, existing_source_urls);

        let registry = match self.registry.lookup(name, state).await {
            Ok(registry) => registry,
            Err(e) => {
                warn!(franchise = %name, state = %state, "Registry lookup failed: {}", e);
                metrics::enrich::collaborator_failure(metrics::REGISTRY_COLLABORATOR);
                RegistryRecord::sentinel()
            }
        };
        // Contact lookup depends on the owner found (or "N/A") by the registry step
        let owner_name = registry.owner_name.clone();
        record.apply_registry(registry);

        let contact = match self.contact.lookup(name, state, &owner_name).await {
            Ok(contact) => contact,
            Err(e) => {
                warn!(franchise = %name, state = %state, "Contact lookup failed: {}", e);
                metrics::enrich::collaborator_failure(metrics::CONTACT_COLLABORATOR);
                ContactRecord::empty()
            }
        };
        record.apply_contact(contact);

        record.confidence = confidence_score(
            &record.registry_fields(),
            &record.contact_fields(),
            &self.fallback,
        );
        debug!(
            franchise = %name,
            confidence = record.confidence,
            sources = record.source_urls.len(),
            "Row enriched"
        );
        metrics::enrich::confidence_recorded(record.confidence);

        record
    }
}

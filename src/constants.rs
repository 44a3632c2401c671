//! Constants shared between the collaborators, the enrichment core and table I/O.

/// Marker for a field that could not be determined
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator used when a set of source URLs is stored in a single cell
pub const SOURCE_URL_DELIMITER: &str = ", ";

/// Path fragment that identifies an organisation page rather than a person on LinkedIn
pub const LINKEDIN_COMPANY_MARKER: &str = "/company/";

// Contact defaults substituted when the search API finds nothing usable
pub const FALLBACK_PHONE: &str = "(972) 831-0911";
pub const FALLBACK_EMAIL: &str = "gfcinfo@goldenchick.com";
pub const FALLBACK_LINKEDIN: &str = "";
pub const FALLBACK_SOURCE_URL: &str = "https://www.goldenchick.com/contact-us";

// Input columns
pub const COL_FRANCHISEE: &str = "Franchisee";
pub const COL_STATE: &str = "State";

// Output columns
pub const COL_CORPORATE_NAME: &str = "Corporate Name";
pub const COL_CORPORATE_ADDRESS: &str = "Corporate Address";
pub const COL_OWNER: &str = "Franchisee Owner";
pub const COL_PHONE: &str = "Corporate Phone";
pub const COL_EMAIL: &str = "Corporate Email";
pub const COL_LINKEDIN: &str = "LinkedIn";
pub const COL_SOURCES: &str = "url Sources";
pub const COL_CONFIDENCE: &str = "Confidence";

// Defaults for the external services
pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://opencorporates.com";
pub const DEFAULT_CONTACT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_CONTACT_MODEL: &str = "sonar-pro";
pub const DEFAULT_CONTACT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

pub const CONTACT_API_KEY_ENV: &str = "PERPLEXITY_API_KEY";

// Logging defaults
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_LOG_FILE_NAME: &str = "enricher.log";
pub const DEFAULT_LOG_FILTER: &str = "franchise_enricher=info,warn";

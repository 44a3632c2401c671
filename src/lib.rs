pub mod config;
pub mod constants;
pub mod enrichment;
pub mod error;
pub mod logging;
pub mod table;
pub mod types;

// Application use cases and the ports they depend on
pub mod app;
// Adapters for the registry and contact services
pub mod infra;

pub mod observability;

// Adapters for the external services behind the app ports

pub mod http_client;
pub mod opencorporates;
pub mod perplexity;

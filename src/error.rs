use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("No registry match for '{name}' in {state}")]
    NoRegistryMatch { name: String, state: String },

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

impl From<calamine::Error> for EnrichError {
    fn from(err: calamine::Error) -> Self {
        EnrichError::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for EnrichError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        EnrichError::Spreadsheet(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} from {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Duplicate repository: {0}")]
    DuplicateRepository(String),
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl DashError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DashError::Api { status, .. } => Some(*status),
            DashError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

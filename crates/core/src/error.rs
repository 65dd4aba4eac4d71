use sheetload_types::TypesError;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Types(#[from] TypesError),
    #[error("HTTP Error: {status} - {body}")]
    TransportFailure { status: u16, body: String },
    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to serialize request body: {0}")]
    Serialization(serde_json::Error),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("table already exists: {0}")]
    TableExists(String),
    #[error("table store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

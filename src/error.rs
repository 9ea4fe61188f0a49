use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for AnalystError {
    fn from(e: polars::error::PolarsError) -> Self {
        AnalystError::Polars(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalystError>;

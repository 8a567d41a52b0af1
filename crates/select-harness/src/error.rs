use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported conversion: {input} input cannot be converted to {output} output")]
    UnsupportedConversion {
        input: &'static str,
        output: &'static str,
    },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("query error: {0}")]
    Query(String),
    #[error("{failed} of {total} scenario(s) failed")]
    ScenariosFailed { failed: usize, total: usize },
}

pub type HarnessResult<T> = Result<T, HarnessError>;

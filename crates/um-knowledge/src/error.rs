use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Configuration names a knowledge model that does not exist.
    #[error("unknown knowledge model {0:?} (expected \"without\", \"local\" or \"global\")")]
    UnknownModel(String),

    #[error("experience store error: {0}")]
    Store(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build knowledge-exchange pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

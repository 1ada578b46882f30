use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The backend could not answer this request (network, timeout, …).
    /// Absorbed by the dispatch unit's retry loop.
    #[error("planner unavailable: {0}")]
    Unavailable(String),

    #[error("planner configuration error: {0}")]
    Config(String),

    #[error("failed to build planning pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

/// Error variants from hyperparameter construction, training or prediction
#[derive(Error, Debug, Clone)]
pub enum TreeError {
    #[error("unknown split criterion {0:?}")]
    UnknownCriterion(String),
    #[error("unknown prune method {0:?}")]
    UnknownPruneMethod(String),
    #[error("invalid chi-squared distribution: {0}")]
    ChiSquared(String),
    #[error("no tree cast a vote")]
    NoVotes,
    #[error(transparent)]
    BaseCrate(#[from] arboretum::Error),
}

use thiserror::Error;

/// Failures that keep a round from starting.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("question set '{set_id}' could not be loaded: {reason}")]
    SourceUnavailable { set_id: String, reason: String },

    #[error("question set '{set_id}' contains no questions")]
    EmptyPool { set_id: String },
}

impl PoolError {
    pub fn unavailable(set_id: &str, reason: impl ToString) -> Self {
        PoolError::SourceUnavailable {
            set_id: set_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn set_id(&self) -> &str {
        match self {
            PoolError::SourceUnavailable { set_id, .. } | PoolError::EmptyPool { set_id } => set_id,
        }
    }
}

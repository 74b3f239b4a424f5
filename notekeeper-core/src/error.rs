use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("note {0} not found")]
    NotFound(Uuid),

    #[error("corrupt note record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("database connection lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("store call did not complete: {0}")]
    Interrupted(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

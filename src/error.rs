use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid lease descriptor {name:?}: {reason}")]
    Validation { name: String, reason: String },

    #[error("lease record {id:?} already exists")]
    Conflict { id: String },

    #[error("lock store failure: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

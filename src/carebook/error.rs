use crate::model::Collection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CareError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    /// The adapter could not supply a collection. Shown as a banner; not retried.
    #[error("Failed to load {collection}: {reason}")]
    Fetch { collection: Collection, reason: String },

    /// The adapter refused a confirmed delete. The listing is left unchanged.
    #[error("Failed to delete {id}: {reason}")]
    Delete { id: String, reason: String },

    #[error("Incorrect confirmation code")]
    ConfirmationMismatch,

    #[error("No deletion is awaiting confirmation")]
    NothingPending,

    #[error("A load is already in progress for {0}")]
    LoadInProgress(Collection),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, CareError>;

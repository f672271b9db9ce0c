use thiserror::Error;
use tokio::io;

use crate::export::ExportError;
use crate::storage::StorageError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("{0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

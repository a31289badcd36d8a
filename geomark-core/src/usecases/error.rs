use thiserror::Error;

use crate::repositories;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid position")]
    InvalidPosition,
    #[error("Unknown category")]
    Category,
    #[error(transparent)]
    Repo(#[from] repositories::Error),
}

impl From<strum::ParseError> for Error {
    fn from(_: strum::ParseError) -> Self {
        Self::Category
    }
}

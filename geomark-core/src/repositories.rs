// Low-level record store access trait. The repository owns the
// durable TaggedLocation records and nothing else; callers never
// reach past it into the storage engine.

use std::io;

use thiserror::Error;

use crate::entities::TaggedLocation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error("The object already exists")]
    AlreadyExists,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

type Result<T> = std::result::Result<T, Error>;

pub trait TaggedLocationRepo {
    fn create_tagged_location(&self, location: &TaggedLocation) -> Result<()>;

    /// Overwrites all fields of an existing record at once.
    fn update_tagged_location(&self, location: &TaggedLocation) -> Result<()>;

    fn get_tagged_location(&self, id: &str) -> Result<TaggedLocation>;

    // Newest first
    fn all_tagged_locations(&self) -> Result<Vec<TaggedLocation>>;
    fn count_tagged_locations(&self) -> Result<usize>;

    fn delete_tagged_location(&self, id: &str) -> Result<()>;
}

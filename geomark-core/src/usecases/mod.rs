mod error;
mod tag_location;
mod update_tagged_location;

#[cfg(test)]
pub mod tests;

pub use self::{error::Error, tag_location::*, update_tagged_location::*};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{entities::*, repositories::*};
}
use self::prelude::*;

pub fn get_tagged_location<R>(repo: &R, id: &Id) -> Result<TaggedLocation>
where
    R: TaggedLocationRepo,
{
    Ok(repo.get_tagged_location(id.as_str())?)
}

pub fn load_tagged_locations<R>(repo: &R) -> Result<Vec<TaggedLocation>>
where
    R: TaggedLocationRepo,
{
    Ok(repo.all_tagged_locations()?)
}

pub fn delete_tagged_location<R>(repo: &R, id: &Id) -> Result<()>
where
    R: TaggedLocationRepo,
{
    Ok(repo.delete_tagged_location(id.as_str())?)
}

#[macro_use]
extern crate log;

mod acquire_fix;
mod tag_location;
mod update_location;

pub mod prelude {
    pub use super::{acquire_fix::*, tag_location::*, update_location::*};
}

pub mod error;

pub type Result<T> = std::result::Result<T, error::AppError>;

pub(crate) use geomark_core::{entities::*, repositories::*, usecases};

#[cfg(test)]
pub(crate) mod tests;

pub(crate) mod sqlite {
    pub use geomark_db_sqlite::Connections;
}

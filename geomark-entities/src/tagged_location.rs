use crate::{address::Address, category::Category, geo::MapPoint, id::Id, time::Timestamp};

/// A captured fix annotated by the user and kept in the record store.
///
/// The coordinate and the address snapshot are frozen at tagging time.
/// They only change through an explicit edit that overwrites all
/// fields at once.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedLocation {
    pub id: Id,
    pub pos: MapPoint,
    pub created_at: Timestamp,
    pub description: String,
    pub category: Category,
    pub address: Option<Address>,
}

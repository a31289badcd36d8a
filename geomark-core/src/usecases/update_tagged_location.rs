use super::prelude::*;

/// The editor's complete in-memory state. A resave overwrites all
/// fields of the record at once; there are no partial updates.
#[rustfmt::skip]
#[derive(Debug, Clone, Default)]
pub struct UpdatedTaggedLocation {
    pub lat         : f64,
    pub lng         : f64,
    pub description : String,
    pub category    : String,
    pub address     : Option<Address>,
}

pub fn update_tagged_location<R>(
    repo: &R,
    id: Id,
    update: UpdatedTaggedLocation,
    created_at: Timestamp,
) -> Result<TaggedLocation>
where
    R: TaggedLocationRepo,
{
    let UpdatedTaggedLocation {
        lat,
        lng,
        description,
        category,
        address,
    } = update;
    let pos = MapPoint::try_from_lat_lng_deg(lat, lng).ok_or(Error::InvalidPosition)?;
    let category = category.parse::<Category>()?;
    let address = address.filter(|addr| !addr.is_empty());
    let location = TaggedLocation {
        id,
        pos,
        created_at,
        description,
        category,
        address,
    };
    repo.update_tagged_location(&location)?;
    Ok(location)
}

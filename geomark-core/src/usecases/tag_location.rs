use super::prelude::*;

#[rustfmt::skip]
#[derive(Debug, Clone, Default)]
pub struct NewTaggedLocation {
    pub lat         : f64,
    pub lng         : f64,
    pub description : String,
    pub category    : String,
    pub address     : Option<Address>,
}

/// A record that passed validation and is ready to be stored.
#[derive(Debug, Clone)]
pub struct Storable(TaggedLocation);

pub fn prepare_new_tagged_location(
    new: NewTaggedLocation,
    created_at: Timestamp,
) -> Result<Storable> {
    let NewTaggedLocation {
        lat,
        lng,
        description,
        category,
        address,
    } = new;
    let pos = MapPoint::try_from_lat_lng_deg(lat, lng).ok_or(Error::InvalidPosition)?;
    let category = category.parse::<Category>()?;
    // An all-empty snapshot carries no information.
    let address = address.filter(|addr| !addr.is_empty());
    Ok(Storable(TaggedLocation {
        id: Id::new(),
        pos,
        created_at,
        description,
        category,
        address,
    }))
}

pub fn store_new_tagged_location<R>(repo: &R, storable: Storable) -> Result<TaggedLocation>
where
    R: TaggedLocationRepo,
{
    let Storable(location) = storable;
    repo.create_tagged_location(&location)?;
    Ok(location)
}

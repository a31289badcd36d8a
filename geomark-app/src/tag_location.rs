use super::*;

pub fn tag_location(
    connections: &sqlite::Connections,
    new_location: usecases::NewTaggedLocation,
    created_at: Timestamp,
) -> crate::Result<TaggedLocation> {
    let location = {
        let mut db = connections.exclusive()?;
        db.transaction(|conn| {
            let storable = usecases::prepare_new_tagged_location(new_location, created_at)?;
            usecases::store_new_tagged_location(conn, storable).map_err(|err| {
                warn!("Failed to store new tagged location: {err}");
                err
            })
        })
    }?;
    Ok(location)
}

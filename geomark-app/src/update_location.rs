use super::*;

/// The fields of the edit screen. Absent fields keep their current
/// value; the resave itself always overwrites the whole record.
#[derive(Debug, Clone, Default)]
pub struct EditTaggedLocation {
    pub description: Option<String>,
    pub category: Option<String>,
    pub pos: Option<(f64, f64)>,
    pub clear_address: bool,
}

pub fn update_location(
    connections: &sqlite::Connections,
    id: Id,
    edit: EditTaggedLocation,
) -> crate::Result<TaggedLocation> {
    let location = {
        let mut db = connections.exclusive()?;
        db.transaction(|conn| {
            let existing = usecases::get_tagged_location(conn, &id)?;
            let EditTaggedLocation {
                description,
                category,
                pos,
                clear_address,
            } = edit;
            let (lat, lng) = pos.unwrap_or_else(|| existing.pos.to_lat_lng_deg());
            let update = usecases::UpdatedTaggedLocation {
                lat,
                lng,
                description: description.unwrap_or(existing.description),
                category: category.unwrap_or_else(|| existing.category.label().to_string()),
                address: if clear_address { None } else { existing.address },
            };
            // The tag time survives the edit.
            usecases::update_tagged_location(conn, id.clone(), update, existing.created_at)
                .map_err(|err| {
                    warn!("Failed to store updated tagged location: {err}");
                    err
                })
        })
    }?;
    Ok(location)
}

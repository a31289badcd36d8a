use anyhow::anyhow;
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    sqlite::SqliteConnection,
};

use geomark_core::{
    entities::*,
    repositories::{self as repo, TaggedLocationRepo},
};

use super::{models, schema, DbConnection, DbReadOnly, DbReadWrite};

type Result<T> = std::result::Result<T, repo::Error>;

fn from_diesel_err(err: DieselError) -> repo::Error {
    match err {
        DieselError::NotFound => repo::Error::NotFound,
        _ => repo::Error::Other(err.into()),
    }
}

impl<'a> From<&'a TaggedLocation> for models::NewTaggedLocation<'a> {
    fn from(from: &'a TaggedLocation) -> Self {
        let (lat, lng) = from.pos.to_lat_lng_deg();
        let addr = from.address.as_ref();
        Self {
            id: from.id.as_str(),
            lat,
            lng,
            created_at: from.created_at.as_millis(),
            description: &from.description,
            category: from.category.label(),
            street: addr.and_then(|addr| addr.street.as_deref()),
            zip: addr.and_then(|addr| addr.zip.as_deref()),
            city: addr.and_then(|addr| addr.city.as_deref()),
            country: addr.and_then(|addr| addr.country.as_deref()),
            state: addr.and_then(|addr| addr.state.as_deref()),
        }
    }
}

fn entity_from_model(model: models::TaggedLocation) -> Result<TaggedLocation> {
    let models::TaggedLocation {
        id,
        lat,
        lng,
        created_at,
        description,
        category,
        street,
        zip,
        city,
        country,
        state,
    } = model;
    let pos = MapPoint::try_from_lat_lng_deg(lat, lng)
        .ok_or_else(|| repo::Error::Other(anyhow!("Invalid stored position: {lat},{lng}")))?;
    let category = category
        .parse::<Category>()
        .map_err(|_| repo::Error::Other(anyhow!("Unknown stored category: {category}")))?;
    let address = Address {
        street,
        zip,
        city,
        country,
        state,
    };
    let address = (!address.is_empty()).then_some(address);
    Ok(TaggedLocation {
        id: id.into(),
        pos,
        created_at: Timestamp::from_millis(created_at),
        description,
        category,
        address,
    })
}

fn create_tagged_location(
    conn: &mut SqliteConnection,
    location: &TaggedLocation,
) -> Result<()> {
    let model = models::NewTaggedLocation::from(location);
    diesel::insert_into(schema::tagged_location::table)
        .values(&model)
        .execute(conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                repo::Error::AlreadyExists
            }
            _ => from_diesel_err(err),
        })?;
    Ok(())
}

fn update_tagged_location(
    conn: &mut SqliteConnection,
    location: &TaggedLocation,
) -> Result<()> {
    use schema::tagged_location::dsl;
    let model = models::NewTaggedLocation::from(location);
    let rows = diesel::update(dsl::tagged_location.filter(dsl::id.eq(location.id.as_str())))
        .set(&model)
        .execute(conn)
        .map_err(from_diesel_err)?;
    if rows == 0 {
        return Err(repo::Error::NotFound);
    }
    Ok(())
}

fn get_tagged_location(conn: &mut SqliteConnection, id: &str) -> Result<TaggedLocation> {
    use schema::tagged_location::dsl;
    let model = dsl::tagged_location
        .filter(dsl::id.eq(id))
        .first::<models::TaggedLocation>(conn)
        .map_err(from_diesel_err)?;
    entity_from_model(model)
}

fn all_tagged_locations(conn: &mut SqliteConnection) -> Result<Vec<TaggedLocation>> {
    use schema::tagged_location::dsl;
    dsl::tagged_location
        .order(dsl::created_at.desc())
        .load::<models::TaggedLocation>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(entity_from_model)
        .collect()
}

fn count_tagged_locations(conn: &mut SqliteConnection) -> Result<usize> {
    use schema::tagged_location::dsl;
    Ok(dsl::tagged_location
        .select(diesel::dsl::count(dsl::id))
        .first::<i64>(conn)
        .map_err(from_diesel_err)? as usize)
}

fn delete_tagged_location(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use schema::tagged_location::dsl;
    let rows = diesel::delete(dsl::tagged_location.filter(dsl::id.eq(id)))
        .execute(conn)
        .map_err(from_diesel_err)?;
    if rows == 0 {
        return Err(repo::Error::NotFound);
    }
    Ok(())
}

impl<'a> TaggedLocationRepo for DbReadOnly<'a> {
    fn create_tagged_location(&self, _location: &TaggedLocation) -> Result<()> {
        unreachable!();
    }
    fn update_tagged_location(&self, _location: &TaggedLocation) -> Result<()> {
        unreachable!();
    }

    fn get_tagged_location(&self, id: &str) -> Result<TaggedLocation> {
        get_tagged_location(&mut self.conn.borrow_mut(), id)
    }
    fn all_tagged_locations(&self) -> Result<Vec<TaggedLocation>> {
        all_tagged_locations(&mut self.conn.borrow_mut())
    }
    fn count_tagged_locations(&self) -> Result<usize> {
        count_tagged_locations(&mut self.conn.borrow_mut())
    }

    fn delete_tagged_location(&self, _id: &str) -> Result<()> {
        unreachable!();
    }
}

impl<'a> TaggedLocationRepo for DbReadWrite<'a> {
    fn create_tagged_location(&self, location: &TaggedLocation) -> Result<()> {
        create_tagged_location(&mut self.conn.borrow_mut(), location)
    }
    fn update_tagged_location(&self, location: &TaggedLocation) -> Result<()> {
        update_tagged_location(&mut self.conn.borrow_mut(), location)
    }

    fn get_tagged_location(&self, id: &str) -> Result<TaggedLocation> {
        get_tagged_location(&mut self.conn.borrow_mut(), id)
    }
    fn all_tagged_locations(&self) -> Result<Vec<TaggedLocation>> {
        all_tagged_locations(&mut self.conn.borrow_mut())
    }
    fn count_tagged_locations(&self) -> Result<usize> {
        count_tagged_locations(&mut self.conn.borrow_mut())
    }

    fn delete_tagged_location(&self, id: &str) -> Result<()> {
        delete_tagged_location(&mut self.conn.borrow_mut(), id)
    }
}

impl<'a> TaggedLocationRepo for DbConnection<'a> {
    fn create_tagged_location(&self, location: &TaggedLocation) -> Result<()> {
        create_tagged_location(&mut self.conn.borrow_mut(), location)
    }
    fn update_tagged_location(&self, location: &TaggedLocation) -> Result<()> {
        update_tagged_location(&mut self.conn.borrow_mut(), location)
    }

    fn get_tagged_location(&self, id: &str) -> Result<TaggedLocation> {
        get_tagged_location(&mut self.conn.borrow_mut(), id)
    }
    fn all_tagged_locations(&self) -> Result<Vec<TaggedLocation>> {
        all_tagged_locations(&mut self.conn.borrow_mut())
    }
    fn count_tagged_locations(&self) -> Result<usize> {
        count_tagged_locations(&mut self.conn.borrow_mut())
    }

    fn delete_tagged_location(&self, id: &str) -> Result<()> {
        delete_tagged_location(&mut self.conn.borrow_mut(), id)
    }
}

// NOTE:
// All timestamps with the `_at` postfix are stored
// as unix timestamp in **milli**seconds.

use super::schema::*;

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = tagged_location)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaggedLocation<'a> {
    pub id: &'a str,
    pub lat: f64,
    pub lng: f64,
    pub created_at: i64,
    pub description: &'a str,
    pub category: &'a str,
    pub street: Option<&'a str>,
    pub zip: Option<&'a str>,
    pub city: Option<&'a str>,
    pub country: Option<&'a str>,
    pub state: Option<&'a str>,
}

#[derive(Queryable)]
pub struct TaggedLocation {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: i64,
    pub description: String,
    pub category: String,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
}

use geocoding::{Opencage, Point};

use geomark_core::gateways::geocode::{GeocodeError, ReverseGeocodingGateway};
use geomark_entities::{address::Address, geo::MapPoint};

/// Reverse geocoding backed by the OpenCage API.
pub struct OpenCage {
    api_key: String,
}

impl OpenCage {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

impl ReverseGeocodingGateway for OpenCage {
    fn reverse_resolve(&self, pos: MapPoint) -> Result<Option<Address>, GeocodeError> {
        let oc_req = Opencage::new(self.api_key.clone());
        let (lat, lng) = pos.to_lat_lng_deg();
        // x = longitude, y = latitude
        let point = Point::new(lng, lat);
        let res = oc_req.reverse_full(&point).map_err(|err| {
            log::warn!("Failed to resolve address of {pos}: {err}");
            GeocodeError(err.to_string())
        })?;
        let Some(result) = res.results.first() else {
            return Ok(None);
        };
        let components = serde_json::to_value(&result.components).unwrap_or_default();
        let addr = address_from_components(&components);
        if addr.is_empty() {
            log::debug!(
                "No usable address components for {pos}: {}",
                result.formatted
            );
            return Ok(None);
        }
        log::debug!("Resolved address of {pos}: {}", result.formatted);
        Ok(Some(addr))
    }
}

fn component<'a>(components: &'a serde_json::Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| components.get(key).and_then(|value| value.as_str()))
}

fn address_from_components(components: &serde_json::Value) -> Address {
    let house_number = component(components, &["house_number"]);
    let road = component(components, &["road", "pedestrian", "footway"]);
    let street = match (house_number, road) {
        (Some(nr), Some(road)) => Some(format!("{nr} {road}")),
        (None, Some(road)) => Some(road.to_string()),
        (Some(nr), None) => Some(nr.to_string()),
        (None, None) => None,
    };
    Address {
        street,
        zip: component(components, &["postcode"]).map(Into::into),
        city: component(components, &["city", "town", "village", "hamlet"]).map(Into::into),
        country: component(components, &["country"]).map(Into::into),
        state: component(components, &["state"]).map(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_full_component_set() {
        let components = json!({
            "house_number": "12",
            "road": "Main Street",
            "postcode": "62704",
            "city": "Springfield",
            "state": "IL",
            "country": "USA",
        });
        let addr = address_from_components(&components);
        assert_eq!(Some("12 Main Street".to_string()), addr.street);
        assert_eq!(Some("62704".to_string()), addr.zip);
        assert_eq!(Some("Springfield".to_string()), addr.city);
        assert_eq!(Some("IL".to_string()), addr.state);
        assert_eq!(Some("USA".to_string()), addr.country);
    }

    #[test]
    fn map_village_without_street() {
        let components = json!({
            "village": "Neudorf",
            "country": "Germany",
        });
        let addr = address_from_components(&components);
        assert_eq!(None, addr.street);
        assert_eq!(Some("Neudorf".to_string()), addr.city);
        assert_eq!(Some("Germany".to_string()), addr.country);
    }

    #[test]
    fn empty_components_yield_an_empty_address() {
        let addr = address_from_components(&json!({}));
        assert!(addr.is_empty());
    }
}

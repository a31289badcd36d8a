use thiserror::Error;

use crate::entities::{Address, MapPoint};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("reverse geocoding failed: {0}")]
pub struct GeocodeError(pub String);

/// Resolves a coordinate into a best-effort address snapshot.
///
/// Implementations block; the caller decides where to run them.
/// `Ok(None)` means the service answered but knows no address for
/// the coordinate.
pub trait ReverseGeocodingGateway {
    fn reverse_resolve(&self, pos: MapPoint) -> Result<Option<Address>, GeocodeError>;
}

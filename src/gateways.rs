use std::sync::Arc;

use anyhow::{bail, Result};

use geomark_core::gateways::geocode::{GeocodeError, ReverseGeocodingGateway};
use geomark_entities::{address::Address, geo::MapPoint};
use geomark_gateways::{
    opencage::OpenCage, permission::StaticPermission, replay::ReplayLocationSource,
};

use crate::config::{Config, GeocodingGateway, Permission};

pub fn geocoding_gateway(cfg: &Config) -> Arc<dyn ReverseGeocodingGateway + Send + Sync> {
    match &cfg.geocoding.gateway {
        Some(GeocodingGateway::OpenCage { api_key }) => {
            log::info!("Use OpenCage geocoding gateway");
            Arc::new(OpenCage::new(api_key.clone()))
        }
        None => {
            log::warn!("No geocoding gateway was configured");
            Arc::new(DummyGeocodingGw)
        }
    }
}

pub fn permission_gateway(cfg: &Config) -> StaticPermission {
    use geomark_core::gateways::permission::PermissionStatus as Status;
    let Permission { status, decision } = cfg.permission;
    match status {
        Status::Authorized => StaticPermission::granted(),
        Status::Denied | Status::Restricted => StaticPermission::denied(),
        Status::Undetermined => StaticPermission::undetermined(decision),
    }
}

pub fn location_source(cfg: &Config) -> Result<ReplayLocationSource> {
    let Some(replay_file) = &cfg.location.replay_file else {
        bail!("No location source configured (set `replay_file` in the [location] section)");
    };
    Ok(ReplayLocationSource::new(replay_file))
}

struct DummyGeocodingGw;

impl ReverseGeocodingGateway for DummyGeocodingGw {
    fn reverse_resolve(&self, _pos: MapPoint) -> Result<Option<Address>, GeocodeError> {
        log::debug!("Cannot resolve addresses because no geocoding gateway was configured");
        Ok(None)
    }
}

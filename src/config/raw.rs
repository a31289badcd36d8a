use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub db: Option<Db>,
    pub location: Option<Location>,
    pub geocoding: Option<Geocoding>,
    pub permission: Option<Permission>,
    pub acquisition: Option<Acquisition>,
    pub gateway: Option<Gateways>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Db {
    #[serde(default = "default_connection_sqlite")]
    pub connection_sqlite: String,
    #[serde(default = "default_connection_pool_size")]
    pub connection_pool_size: u8,
}

const DEFAULT_CONNECTION_SQLITE: &str = "geomark.db";
const DEFAULT_CONNECTION_POOL_SIZE: u8 = 10;

fn default_connection_sqlite() -> String {
    DEFAULT_CONNECTION_SQLITE.to_string()
}

fn default_connection_pool_size() -> u8 {
    DEFAULT_CONNECTION_POOL_SIZE
}

impl Default for Db {
    fn default() -> Self {
        Self {
            connection_sqlite: default_connection_sqlite(),
            connection_pool_size: default_connection_pool_size(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    /// JSON-lines file the replay location source reads from.
    pub replay_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Geocoding {
    pub gateway: Option<GeocodingGateway>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodingGateway {
    Opencage,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gateways {
    pub opencage: Option<OpenCage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenCage {
    pub api_key: String,
}

/// Decision of a headless deployment. `undetermined` answers the
/// first request as if the user had granted access.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Authorized,
    Denied,
    Undetermined,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Acquisition {
    pub desired_accuracy_meters: Option<f64>,
    pub same_spot_distance_meters: Option<f64>,
    #[serde(default, deserialize_with = "duration_str::deserialize_option_duration")]
    pub timeout: Option<Duration>,
    #[serde(default, deserialize_with = "duration_str::deserialize_option_duration")]
    pub max_reading_age: Option<Duration>,
    #[serde(default, deserialize_with = "duration_str::deserialize_option_duration")]
    pub no_improvement_window: Option<Duration>,
}

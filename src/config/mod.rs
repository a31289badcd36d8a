use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};

use geomark_core::{
    acquisition::AcquisitionConfig,
    entities::{Accuracy, Distance},
    gateways::permission::PermissionStatus,
};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "geomark.toml";

const ENV_NAME_DB_URL: &str = "DATABASE_URL";

pub struct Config {
    pub db: Db,
    pub location: Location,
    pub geocoding: Geocoding,
    pub permission: Permission,
    pub acquisition: AcquisitionConfig,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::info!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let raw_config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{DEFAULT_CONFIG_FILE_NAME} not found => load default configuration."
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        if let Ok(db_url) = env::var(ENV_NAME_DB_URL) {
            cfg.db.conn_sqlite = db_url;
        }
        Ok(cfg)
    }
}

pub struct Db {
    /// SQLite connection
    pub conn_sqlite: String,
    pub conn_pool_size: u8,
}

pub struct Location {
    pub replay_file: Option<PathBuf>,
}

pub struct Geocoding {
    pub gateway: Option<GeocodingGateway>,
}

pub enum GeocodingGateway {
    OpenCage { api_key: String },
}

pub struct Permission {
    pub status: PermissionStatus,
    /// Simulated outcome of an `undetermined` request.
    pub decision: PermissionStatus,
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            db,
            location,
            geocoding,
            permission,
            acquisition,
            gateway,
        } = from;

        let raw::Db {
            connection_sqlite,
            connection_pool_size,
        } = db.unwrap_or_default();

        let db = Db {
            conn_sqlite: connection_sqlite,
            conn_pool_size: connection_pool_size,
        };

        let raw::Location { replay_file } = location.unwrap_or_default();
        let location = Location { replay_file };

        let geo_gateway = match geocoding.and_then(|g| g.gateway) {
            Some(gw_name) => {
                let gateway = gateway.ok_or_else(|| anyhow!("Missing gateway configuration"))?;
                let gw = match gw_name {
                    raw::GeocodingGateway::Opencage => {
                        let raw::OpenCage { api_key } = gateway
                            .opencage
                            .ok_or_else(|| anyhow!("Missing 'opencage' gateway configuration"))?;
                        GeocodingGateway::OpenCage { api_key }
                    }
                };
                Some(gw)
            }
            None => None,
        };
        let geocoding = Geocoding {
            gateway: geo_gateway,
        };

        let permission = match permission.unwrap_or_default() {
            raw::Permission::Authorized => Permission {
                status: PermissionStatus::Authorized,
                decision: PermissionStatus::Authorized,
            },
            raw::Permission::Denied => Permission {
                status: PermissionStatus::Denied,
                decision: PermissionStatus::Denied,
            },
            raw::Permission::Undetermined => Permission {
                status: PermissionStatus::Undetermined,
                decision: PermissionStatus::Authorized,
            },
        };

        let raw_acquisition = acquisition.unwrap_or_default();
        let mut acquisition = AcquisitionConfig::default();
        if let Some(meters) = raw_acquisition.desired_accuracy_meters {
            acquisition.desired_accuracy = Accuracy::from_meters(meters);
        }
        if let Some(meters) = raw_acquisition.same_spot_distance_meters {
            acquisition.same_spot_distance = Distance::from_meters(meters);
        }
        if let Some(timeout) = raw_acquisition.timeout {
            acquisition.timeout = timeout.try_into()?;
        }
        if let Some(max_age) = raw_acquisition.max_reading_age {
            acquisition.max_reading_age = max_age.try_into()?;
        }
        if let Some(window) = raw_acquisition.no_improvement_window {
            acquisition.no_improvement_window = window.try_into()?;
        }

        Ok(Self {
            db,
            location,
            geocoding,
            permission,
            acquisition,
        })
    }
}

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

pub type RawCoord = i32;

// Assumption: 2-complement binary representation
const RAW_COORD_INVALID: RawCoord = i32::MIN;
const RAW_COORD_MAX: RawCoord = i32::MAX;
const RAW_COORD_MIN: RawCoord = -RAW_COORD_MAX;

/// Compact fixed-point integer representation of a geographical coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GeoCoord(RawCoord);

impl GeoCoord {
    const INVALID: Self = Self(RAW_COORD_INVALID);

    const fn to_raw(self) -> RawCoord {
        self.0
    }

    const fn from_raw(raw: RawCoord) -> Self {
        Self(raw)
    }

    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for GeoCoord {
    fn default() -> Self {
        let res = Self::INVALID;
        debug_assert!(!res.is_valid());
        res
    }
}

impl PartialOrd for GeoCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self == other {
            Some(std::cmp::Ordering::Equal)
        } else if self.is_valid() && other.is_valid() {
            Some(self.to_raw().cmp(&other.to_raw()))
        } else {
            None
        }
    }
}

macro_rules! angular_coord {
    ($name:ident, $deg_max:expr, $rad_max:expr) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
        pub struct $name(GeoCoord);

        impl $name {
            const RAD_MAX: f64 = $rad_max;
            const RAD_MIN: f64 = -$rad_max;
            const TO_RAD: f64 =
                (Self::RAD_MAX - Self::RAD_MIN) / (RAW_COORD_MAX as f64 - RAW_COORD_MIN as f64);

            const DEG_MAX: f64 = $deg_max;
            const DEG_MIN: f64 = -$deg_max;
            const TO_DEG: f64 =
                (Self::DEG_MAX - Self::DEG_MIN) / (RAW_COORD_MAX as f64 - RAW_COORD_MIN as f64);
            const FROM_DEG: f64 =
                (RAW_COORD_MAX as f64 - RAW_COORD_MIN as f64) / (Self::DEG_MAX - Self::DEG_MIN);

            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }

            pub fn to_rad(self) -> f64 {
                if self.is_valid() {
                    f64::from(self.0.to_raw()) * Self::TO_RAD
                } else {
                    f64::NAN
                }
            }

            pub fn to_deg(self) -> f64 {
                if self.is_valid() {
                    f64::from(self.0.to_raw()) * Self::TO_DEG
                } else {
                    f64::NAN
                }
            }

            pub fn from_deg<T: Into<f64>>(deg: T) -> Self {
                let deg = deg.into();
                debug_assert!(deg >= Self::DEG_MIN);
                debug_assert!(deg <= Self::DEG_MAX);
                let raw = f64::round(deg * Self::FROM_DEG) as RawCoord;
                let res = Self(GeoCoord::from_raw(raw));
                debug_assert!(res.is_valid());
                res
            }

            pub fn try_from_deg<T: Into<f64>>(deg: T) -> Option<Self> {
                let deg = deg.into();
                if (Self::DEG_MIN..=Self::DEG_MAX).contains(&deg) {
                    Some(Self::from_deg(deg))
                } else {
                    None
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
                write!(f, "{}", self.to_deg())
            }
        }
    };
}

angular_coord!(LatCoord, 90.0, std::f64::consts::FRAC_PI_2);
angular_coord!(LngCoord, 180.0, std::f64::consts::PI);

/// Compact internal representation of a geographical location on a (flat) map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPoint {
    lat: LatCoord,
    lng: LngCoord,
}

#[derive(Debug, Error, PartialEq)]
pub enum MapPointParseError {
    #[error("Malformed coordinate pair: {0}")]
    MalformedPair(String),
    #[error("Invalid degrees '{0}'")]
    InvalidDegrees(String),
    #[error("Latitude degrees out of range: {0}")]
    LatitudeOutOfRange(f64),
    #[error("Longitude degrees out of range: {0}")]
    LongitudeOutOfRange(f64),
}

impl MapPoint {
    pub const fn new(lat: LatCoord, lng: LngCoord) -> Self {
        Self { lat, lng }
    }

    pub const fn lat(self) -> LatCoord {
        self.lat
    }

    pub const fn lng(self) -> LngCoord {
        self.lng
    }

    pub fn is_valid(self) -> bool {
        self.lat.is_valid() && self.lng.is_valid()
    }

    pub fn to_lat_lng_rad(self) -> (f64, f64) {
        (self.lat.to_rad(), self.lng.to_rad())
    }

    pub fn to_lat_lng_deg(self) -> (f64, f64) {
        (self.lat.to_deg(), self.lng.to_deg())
    }

    pub fn from_lat_lng_deg<LAT: Into<f64>, LNG: Into<f64>>(lat: LAT, lng: LNG) -> Self {
        Self::new(LatCoord::from_deg(lat), LngCoord::from_deg(lng))
    }

    pub fn try_from_lat_lng_deg<LAT: Into<f64>, LNG: Into<f64>>(
        lat: LAT,
        lng: LNG,
    ) -> Option<Self> {
        match (LatCoord::try_from_deg(lat), LngCoord::try_from_deg(lng)) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)),
            _ => None,
        }
    }

    fn parse_lat_lng_deg(
        lat_deg_str: &str,
        lng_deg_str: &str,
    ) -> Result<Self, MapPointParseError> {
        let lat_deg = lat_deg_str
            .trim()
            .parse::<f64>()
            .map_err(|_| MapPointParseError::InvalidDegrees(lat_deg_str.to_string()))?;
        let lng_deg = lng_deg_str
            .trim()
            .parse::<f64>()
            .map_err(|_| MapPointParseError::InvalidDegrees(lng_deg_str.to_string()))?;
        let lat = LatCoord::try_from_deg(lat_deg)
            .ok_or(MapPointParseError::LatitudeOutOfRange(lat_deg))?;
        let lng = LngCoord::try_from_deg(lng_deg)
            .ok_or(MapPointParseError::LongitudeOutOfRange(lng_deg))?;
        Ok(MapPoint::new(lat, lng))
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl std::str::FromStr for MapPoint {
    type Err = MapPointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((lat_deg_str, lng_deg_str)) = s.split(',').collect_tuple() {
            MapPoint::parse_lat_lng_deg(lat_deg_str, lng_deg_str)
        } else {
            Err(MapPointParseError::MalformedPair(s.to_string()))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Distance(pub f64);

impl Distance {
    pub const fn infinite() -> Self {
        Self(f64::INFINITY)
    }

    pub const fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub const fn to_meters(self) -> f64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 0.0
    }
}

const MEAN_EARTH_RADIUS: Distance = Distance::from_meters(6_371_200.0);

impl MapPoint {
    /// Calculate the great-circle distance on the surface
    /// of the earth using a special case of the Vincenty
    /// formula for numerical accuracy.
    /// Reference: https://en.wikipedia.org/wiki/Great-circle_distance
    pub fn distance(p1: MapPoint, p2: MapPoint) -> Option<Distance> {
        if !p1.is_valid() || !p2.is_valid() {
            return None;
        }

        let (lat1_rad, lng1_rad) = p1.to_lat_lng_rad();
        let (lat2_rad, lng2_rad) = p2.to_lat_lng_rad();

        let (lat1_sin, lat1_cos) = (lat1_rad.sin(), lat1_rad.cos());
        let (lat2_sin, lat2_cos) = (lat2_rad.sin(), lat2_rad.cos());

        let dlng = (lng1_rad - lng2_rad).abs();
        let (dlng_sin, dlng_cos) = (dlng.sin(), dlng.cos());

        let nom1 = lat2_cos * dlng_sin;
        let nom2 = lat1_cos * lat2_sin - lat1_sin * lat2_cos * dlng_cos;

        let nom = (nom1 * nom1 + nom2 * nom2).sqrt();
        let denom = lat1_sin * lat2_sin + lat1_cos * lat2_cos * dlng_cos;

        Some(Distance::from_meters(
            MEAN_EARTH_RADIUS.to_meters() * nom.atan2(denom),
        ))
    }
}

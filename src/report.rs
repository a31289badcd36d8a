// User-facing rendering of fixes, records and failures.

use geomark_app::prelude::{AcquireFixError, AddressLookup, Fix};
use geomark_core::entities::{TaggedLocation, Timestamp};
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!(
    "[month repr:short] [day padding:none], [year] at [hour repr:12 padding:none]:[minute] [period]"
);

pub fn format_date(at: Timestamp) -> String {
    OffsetDateTime::from(at)
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| at.to_string())
}

pub fn error_status(err: &AcquireFixError) -> &'static str {
    match err {
        AcquireFixError::PermissionDenied | AcquireFixError::Start(_) => {
            "Location Services Disabled"
        }
        AcquireFixError::NoFix | AcquireFixError::Source(_) => "Error Getting Location",
    }
}

fn address_status(fix: &Fix) -> String {
    match &fix.address {
        AddressLookup::Resolved(address) => {
            let (line1, line2) = address.display_lines();
            format!("{line1}\n{line2}")
        }
        AddressLookup::NoneFound => "No Address Found".into(),
        AddressLookup::Failed => "Error Finding Address".into(),
    }
}

pub fn fix_report(fix: &Fix) -> String {
    let (lat, lng) = fix.reading.pos.to_lat_lng_deg();
    format!(
        "Latitude: {lat:.8}\nLongitude: {lng:.8}\nAccuracy: {}\n{}",
        fix.reading.accuracy,
        address_status(fix)
    )
}

pub fn location_summary(location: &TaggedLocation) -> String {
    let description = if location.description.is_empty() {
        "(No Description)"
    } else {
        location.description.as_str()
    };
    format!(
        "{}  {}  {}  {}",
        location.id,
        format_date(location.created_at),
        location.category.label(),
        description
    )
}

pub fn location_details(location: &TaggedLocation) -> String {
    let (lat, lng) = location.pos.to_lat_lng_deg();
    let address = location
        .address
        .as_ref()
        .map(|addr| addr.single_line())
        .unwrap_or_else(|| "No Address Found".into());
    format!(
        "Description: {}\nCategory: {}\nLatitude: {lat:.8}\nLongitude: {lng:.8}\nAddress: {address}\nDate: {}",
        location.description,
        location.category.label(),
        format_date(location.created_at)
    )
}

use std::{cell::Cell, sync::Arc};

use time::Duration;

use geomark_core::{
    acquisition::AcquisitionConfig,
    entities::*,
    gateways::{
        geocode::{GeocodeError, ReverseGeocodingGateway},
        location::{
            LocationSource, LocationSourceError, LocationUpdate, StartUpdatesError, UpdateSink,
        },
        permission::{DecisionCallback, PermissionGateway, PermissionStatus},
    },
    repositories::TaggedLocationRepo,
    usecases,
};
use geomark_db_sqlite::run_embedded_database_migrations;

use crate::{error::*, prelude as flows, sqlite};

fn fixture() -> sqlite::Connections {
    let connections = sqlite::Connections::init(":memory:", 1).unwrap();
    run_embedded_database_migrations(connections.exclusive().unwrap());
    connections
}

struct ScriptedSource {
    updates: Vec<LocationUpdate>,
    started: bool,
}

impl ScriptedSource {
    fn new(updates: Vec<LocationUpdate>) -> Self {
        Self {
            updates,
            started: false,
        }
    }
}

impl LocationSource for ScriptedSource {
    fn start_updates(&mut self, mut sink: UpdateSink) -> Result<(), StartUpdatesError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        for update in self.updates.drain(..) {
            sink(update);
        }
        Ok(())
    }

    fn stop_updates(&mut self) {}
}

struct StubGeocoder {
    result: Result<Option<Address>, GeocodeError>,
}

impl ReverseGeocodingGateway for StubGeocoder {
    fn reverse_resolve(&self, _pos: MapPoint) -> Result<Option<Address>, GeocodeError> {
        self.result.clone()
    }
}

struct TestPermission {
    status: Cell<PermissionStatus>,
    decision: PermissionStatus,
}

impl TestPermission {
    fn new(status: PermissionStatus, decision: PermissionStatus) -> Self {
        Self {
            status: Cell::new(status),
            decision,
        }
    }

    fn granted() -> Self {
        Self::new(PermissionStatus::Authorized, PermissionStatus::Authorized)
    }
}

impl PermissionGateway for TestPermission {
    fn status(&self) -> PermissionStatus {
        self.status.get()
    }

    fn request(&self, on_decision: DecisionCallback) {
        self.status.set(self.decision);
        on_decision(self.decision);
    }
}

fn reading_now(accuracy: f64) -> LocationUpdate {
    LocationUpdate::Reading(Reading {
        pos: MapPoint::from_lat_lng_deg(48.7755, 9.1827),
        accuracy: Accuracy::from_meters(accuracy),
        recorded_at: Timestamp::now(),
    })
}

fn some_address() -> Address {
    Address {
        street: Some("12 Main Street".into()),
        city: Some("Springfield".into()),
        ..Default::default()
    }
}

mod acquire {
    use super::*;

    #[test]
    fn acquire_a_fix_with_an_address() {
        let mut source = ScriptedSource::new(vec![reading_now(50.0), reading_now(10.0)]);
        let permission = TestPermission::granted();
        let geocoder = Arc::new(StubGeocoder {
            result: Ok(Some(some_address())),
        });
        let fix = flows::acquire_fix(
            &mut source,
            &permission,
            geocoder,
            AcquisitionConfig::default(),
        )
        .unwrap();
        assert_eq!(10.0, fix.reading.accuracy.to_meters());
        assert_eq!(Some(&some_address()), fix.address());
    }

    #[test]
    fn failed_lookup_degrades_to_address_unavailable() {
        let mut source = ScriptedSource::new(vec![reading_now(10.0)]);
        let permission = TestPermission::granted();
        let geocoder = Arc::new(StubGeocoder {
            result: Err(GeocodeError("service unreachable".into())),
        });
        let fix = flows::acquire_fix(
            &mut source,
            &permission,
            geocoder,
            AcquisitionConfig::default(),
        )
        .unwrap();
        assert_eq!(flows::AddressLookup::Failed, fix.address);
        assert_eq!(None, fix.address());
    }

    #[test]
    fn no_updates_time_out_without_a_fix() {
        let mut source = ScriptedSource::new(vec![]);
        let permission = TestPermission::granted();
        let geocoder = Arc::new(StubGeocoder { result: Ok(None) });
        let config = AcquisitionConfig {
            timeout: Duration::milliseconds(50),
            ..Default::default()
        };
        let err = flows::acquire_fix(&mut source, &permission, geocoder, config).unwrap_err();
        assert!(matches!(err, AcquireFixError::NoFix));
    }

    #[test]
    fn denied_permission_aborts() {
        let mut source = ScriptedSource::new(vec![reading_now(10.0)]);
        let permission =
            TestPermission::new(PermissionStatus::Denied, PermissionStatus::Denied);
        let geocoder = Arc::new(StubGeocoder { result: Ok(None) });
        let err = flows::acquire_fix(
            &mut source,
            &permission,
            geocoder,
            AcquisitionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AcquireFixError::PermissionDenied));
    }

    #[test]
    fn undetermined_permission_is_requested_and_granted() {
        let mut source = ScriptedSource::new(vec![reading_now(10.0)]);
        let permission =
            TestPermission::new(PermissionStatus::Undetermined, PermissionStatus::Authorized);
        let geocoder = Arc::new(StubGeocoder { result: Ok(None) });
        let fix = flows::acquire_fix(
            &mut source,
            &permission,
            geocoder,
            AcquisitionConfig::default(),
        )
        .unwrap();
        assert_eq!(10.0, fix.reading.accuracy.to_meters());
        assert_eq!(flows::AddressLookup::NoneFound, fix.address);
    }

    #[test]
    fn undetermined_permission_with_denial_aborts() {
        let mut source = ScriptedSource::new(vec![reading_now(10.0)]);
        let permission =
            TestPermission::new(PermissionStatus::Undetermined, PermissionStatus::Denied);
        let geocoder = Arc::new(StubGeocoder { result: Ok(None) });
        let err = flows::acquire_fix(
            &mut source,
            &permission,
            geocoder,
            AcquisitionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AcquireFixError::PermissionDenied));
    }

    #[test]
    fn fatal_source_failure_aborts() {
        let mut source = ScriptedSource::new(vec![LocationUpdate::Failed(
            LocationSourceError::Fatal("device gone".into()),
        )]);
        let permission = TestPermission::granted();
        let geocoder = Arc::new(StubGeocoder { result: Ok(None) });
        let err = flows::acquire_fix(
            &mut source,
            &permission,
            geocoder,
            AcquisitionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AcquireFixError::Source(LocationSourceError::Fatal(_))
        ));
    }
}

mod store {
    use super::*;

    fn new_location() -> usecases::NewTaggedLocation {
        usecases::NewTaggedLocation {
            lat: 48.7755,
            lng: 9.1827,
            description: "favorite coffee".into(),
            category: "Bar".into(),
            address: Some(some_address()),
        }
    }

    #[test]
    fn tag_and_reload() {
        let connections = fixture();
        let created_at = Timestamp::now();
        let location = flows::tag_location(&connections, new_location(), created_at).unwrap();
        let reloaded = connections
            .shared()
            .unwrap()
            .get_tagged_location(location.id.as_str())
            .unwrap();
        assert_eq!(location, reloaded);
        assert_eq!(Category::Bar, reloaded.category);
        assert_eq!(Some(some_address()), reloaded.address);
    }

    #[test]
    fn tagging_with_an_unknown_category_fails() {
        let connections = fixture();
        let new = usecases::NewTaggedLocation {
            category: "Supermarket".into(),
            ..new_location()
        };
        let err = flows::tag_location(&connections, new, Timestamp::now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Business(BError::Parameter(usecases::Error::Category))
        ));
    }

    #[test]
    fn edit_keeps_absent_fields_and_overwrites_the_record() {
        let connections = fixture();
        let location =
            flows::tag_location(&connections, new_location(), Timestamp::now()).unwrap();

        let edit = flows::EditTaggedLocation {
            description: Some("revised".into()),
            clear_address: true,
            ..Default::default()
        };
        let updated = flows::update_location(&connections, location.id.clone(), edit).unwrap();

        assert_eq!("revised", updated.description);
        // Untouched fields survive the overwrite-all resave.
        assert_eq!(location.category, updated.category);
        assert_eq!(location.pos, updated.pos);
        assert_eq!(location.created_at, updated.created_at);
        assert_eq!(None, updated.address);

        let reloaded = connections
            .shared()
            .unwrap()
            .get_tagged_location(location.id.as_str())
            .unwrap();
        assert_eq!(updated, reloaded);
    }

    #[test]
    fn editing_a_missing_record_fails() {
        let connections = fixture();
        let err = flows::update_location(
            &connections,
            Id::new(),
            flows::EditTaggedLocation::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Business(_)));
    }
}

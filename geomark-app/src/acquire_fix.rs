use std::{
    sync::{mpsc, Arc},
    thread,
    time::{Duration as StdDuration, Instant},
};

use thiserror::Error;

use geomark_core::{
    acquisition::{
        Acquisition, AcquisitionConfig, AcquisitionError, Effect, Event, GeocodeState, GeocodeToken,
    },
    entities::{Address, Reading, Timestamp},
    gateways::{
        geocode::{GeocodeError, ReverseGeocodingGateway},
        location::{LocationSource, LocationSourceError, LocationUpdate, StartUpdatesError},
        permission::{PermissionGateway, PermissionStatus},
    },
};

/// How long a finished attempt waits for the completion of the final
/// address lookup before giving up on it.
const GEOCODE_GRACE: StdDuration = StdDuration::from_secs(10);

#[derive(Debug, Error)]
pub enum AcquireFixError {
    #[error("permission to use the location service was denied")]
    PermissionDenied,
    #[error(transparent)]
    Source(LocationSourceError),
    #[error("no fix was acquired before the timeout")]
    NoFix,
    #[error(transparent)]
    Start(#[from] StartUpdatesError),
}

impl From<AcquisitionError> for AcquireFixError {
    fn from(err: AcquisitionError) -> Self {
        match err {
            AcquisitionError::PermissionDenied => Self::PermissionDenied,
            AcquisitionError::Source(err) => Self::Source(err),
            AcquisitionError::NoFix => Self::NoFix,
        }
    }
}

/// Outcome of the address lookup that accompanied the fix.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressLookup {
    Resolved(Address),
    NoneFound,
    Failed,
}

/// Terminal result of a capture attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub reading: Reading,
    pub address: AddressLookup,
}

impl Fix {
    pub fn address(&self) -> Option<&Address> {
        match &self.address {
            AddressLookup::Resolved(address) => Some(address),
            AddressLookup::NoneFound | AddressLookup::Failed => None,
        }
    }
}

enum Input {
    Update(LocationUpdate),
    PermissionDecided(PermissionStatus),
    GeocodeFinished {
        token: GeocodeToken,
        result: Result<Option<Address>, GeocodeError>,
    },
}

impl From<Input> for Event {
    fn from(from: Input) -> Self {
        match from {
            Input::Update(update) => Event::Update(update),
            Input::PermissionDecided(status) => Event::PermissionDecided(status),
            Input::GeocodeFinished { token, result } => Event::GeocodeFinished { token, result },
        }
    }
}

/// Drives one acquisition attempt to its end: starts the source,
/// feeds every update into the state machine, executes the returned
/// effects and enforces the timeout. Blocks until the attempt is
/// terminal.
///
/// The gateways push their updates into a channel owned by this
/// loop; all decisions happen here, single-threaded. An in-flight
/// address lookup cannot be cancelled. Its late completion is either
/// awaited (terminal fix) or discarded by the state machine's token
/// check.
pub fn acquire_fix(
    source: &mut dyn LocationSource,
    permission: &dyn PermissionGateway,
    geocoder: Arc<dyn ReverseGeocodingGateway + Send + Sync>,
    config: AcquisitionConfig,
) -> Result<Fix, AcquireFixError> {
    let (tx, rx) = mpsc::channel();
    let mut acquisition = Acquisition::new(config);
    let mut deadline: Option<Instant> = None;

    let effects = acquisition.apply(
        Timestamp::now(),
        Event::Requested {
            permission: permission.status(),
        },
    );
    let effects = match resolve_permission(effects, &mut acquisition, permission, &tx, &rx)? {
        Some(effects) => effects,
        None => return Err(AcquireFixError::PermissionDenied),
    };
    execute_effects(effects, source, &geocoder, &tx, &mut deadline)?;

    while acquisition.is_acquiring() {
        let input = match deadline {
            Some(at) => {
                let wait = at.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(input) => Some(input),
                    Err(mpsc::RecvTimeoutError::Timeout) => None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        unreachable!("the loop holds a sender")
                    }
                }
            }
            None => match rx.recv() {
                Ok(input) => Some(input),
                Err(_) => unreachable!("the loop holds a sender"),
            },
        };
        let effects = match input {
            Some(input) => acquisition.apply(Timestamp::now(), input.into()),
            None => {
                // The one-shot timer fired.
                deadline = None;
                acquisition.apply(Timestamp::now(), Event::DeadlineElapsed)
            }
        };
        execute_effects(effects, source, &geocoder, &tx, &mut deadline)?;
    }

    if let Some(err) = acquisition.last_error() {
        return Err(err.clone().into());
    }
    let Some(reading) = acquisition.best().copied() else {
        return Err(AcquireFixError::NoFix);
    };

    await_final_lookup(&mut acquisition, &rx);

    let address = match acquisition.geocode_state() {
        GeocodeState::Resolved { address } => AddressLookup::Resolved(address.clone()),
        GeocodeState::NoResult | GeocodeState::Idle => AddressLookup::NoneFound,
        GeocodeState::Failed | GeocodeState::InFlight { .. } => AddressLookup::Failed,
    };
    Ok(Fix { reading, address })
}

/// Handles the permission gate of a fresh attempt: an undetermined
/// status asks the user once and retries with the decision.
/// Returns the effects of the (re)started attempt, or `None` if the
/// attempt may not proceed.
fn resolve_permission(
    effects: Vec<Effect>,
    acquisition: &mut Acquisition,
    permission: &dyn PermissionGateway,
    tx: &mpsc::Sender<Input>,
    rx: &mpsc::Receiver<Input>,
) -> Result<Option<Vec<Effect>>, AcquireFixError> {
    if !effects.contains(&Effect::RequestPermission) {
        if acquisition.last_error().is_some() {
            return Ok(None);
        }
        return Ok(Some(effects));
    }
    let decision_tx = tx.clone();
    permission.request(Box::new(move |status| {
        let _ = decision_tx.send(Input::PermissionDecided(status));
    }));
    // Nothing else has been started yet, so the next input is the
    // user's decision.
    let Ok(input) = rx.recv() else {
        return Err(AcquireFixError::PermissionDenied);
    };
    acquisition.apply(Timestamp::now(), input.into());
    let status = permission.status();
    if !status.allows_updates() {
        return Ok(None);
    }
    let effects = acquisition.apply(Timestamp::now(), Event::Requested { permission: status });
    Ok(Some(effects))
}

fn execute_effects(
    effects: Vec<Effect>,
    source: &mut dyn LocationSource,
    geocoder: &Arc<dyn ReverseGeocodingGateway + Send + Sync>,
    tx: &mpsc::Sender<Input>,
    deadline: &mut Option<Instant>,
) -> Result<(), AcquireFixError> {
    for effect in effects {
        match effect {
            Effect::RequestPermission => {
                // Handled by `resolve_permission` before the loop starts.
            }
            Effect::StartUpdates => {
                let update_tx = tx.clone();
                source.start_updates(Box::new(move |update| {
                    let _ = update_tx.send(Input::Update(update));
                }))?;
            }
            Effect::StopUpdates => source.stop_updates(),
            Effect::ScheduleTimeout(timeout) => {
                let timeout = StdDuration::try_from(timeout).unwrap_or_default();
                *deadline = Some(Instant::now() + timeout);
            }
            Effect::CancelTimeout => *deadline = None,
            Effect::Geocode { token, pos } => {
                let geocoder = Arc::clone(geocoder);
                let result_tx = tx.clone();
                thread::spawn(move || {
                    let result = geocoder.reverse_resolve(pos);
                    let _ = result_tx.send(Input::GeocodeFinished { token, result });
                });
            }
        }
    }
    Ok(())
}

/// Waits (bounded) for the completion of an address lookup that is
/// still running when the attempt ends.
fn await_final_lookup(acquisition: &mut Acquisition, rx: &mpsc::Receiver<Input>) {
    while matches!(acquisition.geocode_state(), GeocodeState::InFlight { .. }) {
        match rx.recv_timeout(GEOCODE_GRACE) {
            Ok(input) => {
                acquisition.apply(Timestamp::now(), input.into());
            }
            Err(_) => {
                warn!("Reverse geocoding did not complete in time");
                break;
            }
        }
    }
}

// Fix acquisition as a pure reducer: callers feed events in and
// execute the returned effects. All timing is driven from outside
// through the `now` argument, so the whole lifecycle is testable
// without a real location service.

use time::Duration;

use crate::{
    entities::{Accuracy, Address, Distance, MapPoint, Reading, Timestamp},
    gateways::{
        geocode::GeocodeError,
        location::{LocationSourceError, LocationUpdate},
        permission::PermissionStatus,
    },
};


/// Tuning knobs of a single acquisition attempt.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// A fix at least this accurate ends the attempt.
    pub desired_accuracy: Accuracy,
    /// Readings older than this are discarded as stale.
    pub max_reading_age: Duration,
    /// The attempt fails with `NoFix` if no reading was ever
    /// accepted within this window.
    pub timeout: Duration,
    /// Rejected readings closer than this to the current best count
    /// as "same place" for the settle rule.
    pub same_spot_distance: Distance,
    /// Same-place readings for longer than this end the attempt with
    /// the current best; waiting further will not pay off.
    pub no_improvement_window: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            desired_accuracy: Accuracy::from_meters(10.0),
            max_reading_age: Duration::seconds(5),
            timeout: Duration::seconds(60),
            same_spot_distance: Distance::from_meters(1.0),
            no_improvement_window: Duration::seconds(10),
        }
    }
}

/// Identifies one outstanding reverse-geocode request. Completions
/// carrying any other token are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeocodeToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Acquiring,
    Done,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("permission to use the location service was denied")]
    PermissionDenied,
    #[error(transparent)]
    Source(LocationSourceError),
    #[error("no fix was acquired before the timeout")]
    NoFix,
}

/// Lifecycle of the address lookup for the current attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeState {
    /// Nothing requested (yet).
    Idle,
    InFlight { token: GeocodeToken },
    Resolved { address: Address },
    /// The service answered but knows no address for the coordinate.
    NoResult,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Explicit user request to acquire a fix, together with the
    /// current permission status.
    Requested { permission: PermissionStatus },
    /// Outcome of an asynchronous permission request.
    PermissionDecided(PermissionStatus),
    Update(LocationUpdate),
    GeocodeFinished {
        token: GeocodeToken,
        result: Result<Option<Address>, GeocodeError>,
    },
    /// The acquisition timeout elapsed. One-shot: a deadline that
    /// fires after a fix was accepted is consumed without effect.
    DeadlineElapsed,
    /// Explicit stop. Ends an attempt, or resets a finished one.
    Stopped,
}

/// Instructions for the driver executing an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestPermission,
    StartUpdates,
    StopUpdates,
    ScheduleTimeout(Duration),
    CancelTimeout,
    Geocode { token: GeocodeToken, pos: MapPoint },
}

#[derive(Debug)]
pub struct Acquisition {
    config: AcquisitionConfig,
    phase: Phase,
    best: Option<Reading>,
    last_error: Option<AcquisitionError>,
    geocode: GeocodeState,
    issued_tokens: u64,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new(AcquisitionConfig::default())
    }
}

impl Acquisition {
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            best: None,
            last_error: None,
            geocode: GeocodeState::Idle,
            issued_tokens: 0,
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_acquiring(&self) -> bool {
        self.phase == Phase::Acquiring
    }

    /// The reading currently presented as authoritative.
    pub fn best(&self) -> Option<&Reading> {
        self.best.as_ref()
    }

    pub fn last_error(&self) -> Option<&AcquisitionError> {
        self.last_error.as_ref()
    }

    pub fn geocode_state(&self) -> &GeocodeState {
        &self.geocode
    }

    pub fn address(&self) -> Option<&Address> {
        match &self.geocode {
            GeocodeState::Resolved { address } => Some(address),
            _ => None,
        }
    }

    pub fn apply(&mut self, now: Timestamp, event: Event) -> Vec<Effect> {
        match event {
            Event::Requested { permission } => self.handle_request(permission),
            Event::PermissionDecided(status) => self.handle_permission_decision(status),
            Event::Update(LocationUpdate::Reading(reading)) => self.handle_reading(now, reading),
            Event::Update(LocationUpdate::Failed(err)) => self.handle_source_error(err),
            Event::GeocodeFinished { token, result } => self.handle_geocode_finished(token, result),
            Event::DeadlineElapsed => self.handle_deadline(),
            Event::Stopped => self.handle_stop(),
        }
    }

    fn handle_request(&mut self, permission: PermissionStatus) -> Vec<Effect> {
        match permission {
            PermissionStatus::Undetermined => {
                // Abort this attempt; the decision arrives as an event
                // and a fresh request has to be issued.
                vec![Effect::RequestPermission]
            }
            PermissionStatus::Denied | PermissionStatus::Restricted => {
                self.last_error = Some(AcquisitionError::PermissionDenied);
                vec![]
            }
            PermissionStatus::Authorized => {
                self.phase = Phase::Acquiring;
                self.best = None;
                self.last_error = None;
                self.geocode = GeocodeState::Idle;
                vec![
                    Effect::StartUpdates,
                    Effect::ScheduleTimeout(self.config.timeout),
                ]
            }
        }
    }

    fn handle_permission_decision(&mut self, status: PermissionStatus) -> Vec<Effect> {
        if let PermissionStatus::Denied | PermissionStatus::Restricted = status {
            self.last_error = Some(AcquisitionError::PermissionDenied);
        }
        vec![]
    }

    fn handle_reading(&mut self, now: Timestamp, new: Reading) -> Vec<Effect> {
        if self.phase != Phase::Acquiring {
            // Stopped attempts silence late callbacks.
            return vec![];
        }
        if new.age_at(now) > self.config.max_reading_age {
            return vec![];
        }
        if !new.accuracy.is_valid() {
            return vec![];
        }

        let distance_to_best = self
            .best
            .and_then(|best| MapPoint::distance(best.pos, new.pos))
            .unwrap_or(Distance::infinite());

        match &self.best {
            Some(best) if !new.accuracy.is_better_than(best.accuracy) => {
                // Not an improvement. Once the position has settled and no
                // better reading arrived for a while, give up waiting and
                // keep the current best.
                let waited = new.recorded_at.duration_since(best.recorded_at);
                if distance_to_best < self.config.same_spot_distance
                    && waited > self.config.no_improvement_window
                {
                    log::debug!("No further improvement expected, keeping current fix");
                    self.phase = Phase::Done;
                    return vec![Effect::StopUpdates, Effect::CancelTimeout];
                }
                vec![]
            }
            _ => self.accept_reading(new, distance_to_best),
        }
    }

    fn accept_reading(&mut self, new: Reading, distance_to_best: Distance) -> Vec<Effect> {
        self.last_error = None;
        let had_best = self.best.replace(new).is_some();

        let mut effects = Vec::new();
        if new.accuracy.meets(self.config.desired_accuracy) {
            self.phase = Phase::Done;
            effects.push(Effect::StopUpdates);
            effects.push(Effect::CancelTimeout);
            // The final fix may have moved away from the coordinate that
            // is currently being resolved. Invalidate the outstanding
            // request so the lookup below targets the fix that is kept;
            // its late completion is discarded by the token check.
            if had_best
                && distance_to_best.to_meters() > 0.0
                && matches!(self.geocode, GeocodeState::InFlight { .. })
            {
                self.geocode = GeocodeState::Idle;
            }
        }
        if !matches!(self.geocode, GeocodeState::InFlight { .. }) {
            let token = self.issue_token();
            self.geocode = GeocodeState::InFlight { token };
            effects.push(Effect::Geocode {
                token,
                pos: new.pos,
            });
        }
        effects
    }

    fn handle_source_error(&mut self, err: LocationSourceError) -> Vec<Effect> {
        if self.phase != Phase::Acquiring {
            return vec![];
        }
        if !err.is_fatal() {
            // Keep listening until a coordinate is found.
            log::debug!("Ignoring transient location error: {err}");
            return vec![];
        }
        log::warn!("Location source failed: {err}");
        self.last_error = Some(AcquisitionError::Source(err));
        self.phase = Phase::Done;
        vec![Effect::StopUpdates, Effect::CancelTimeout]
    }

    fn handle_geocode_finished(
        &mut self,
        token: GeocodeToken,
        result: Result<Option<Address>, GeocodeError>,
    ) -> Vec<Effect> {
        let current = match &self.geocode {
            GeocodeState::InFlight { token } => Some(*token),
            _ => None,
        };
        if current != Some(token) {
            // Superseded, or delivered after the attempt ended.
            log::debug!("Discarding stale reverse geocoding completion");
            return vec![];
        }
        self.geocode = match result {
            Ok(Some(address)) => GeocodeState::Resolved { address },
            Ok(None) => GeocodeState::NoResult,
            Err(err) => {
                log::warn!("{err}");
                GeocodeState::Failed
            }
        };
        vec![]
    }

    fn handle_deadline(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Acquiring {
            return vec![];
        }
        if self.best.is_some() {
            // The one-shot timer fired after a usable fix arrived.
            // Acquisition continues until the accuracy threshold or the
            // settle rule ends it.
            return vec![];
        }
        log::warn!("Timed out without a fix");
        self.last_error = Some(AcquisitionError::NoFix);
        self.phase = Phase::Done;
        vec![Effect::StopUpdates]
    }

    fn handle_stop(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Acquiring => {
                self.phase = Phase::Done;
                // Unlike a terminal fix, an explicit stop no longer cares
                // about the outstanding lookup. It cannot be cancelled,
                // so its completion is left to the token check.
                if matches!(self.geocode, GeocodeState::InFlight { .. }) {
                    self.geocode = GeocodeState::Idle;
                }
                vec![Effect::StopUpdates, Effect::CancelTimeout]
            }
            Phase::Done => {
                self.phase = Phase::Idle;
                self.best = None;
                self.last_error = None;
                self.geocode = GeocodeState::Idle;
                vec![]
            }
            Phase::Idle => vec![],
        }
    }

    fn issue_token(&mut self) -> GeocodeToken {
        self.issued_tokens += 1;
        GeocodeToken(self.issued_tokens)
    }
}

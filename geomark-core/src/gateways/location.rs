use thiserror::Error;

use crate::entities::Reading;

/// What the location source pushes to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationUpdate {
    Reading(Reading),
    Failed(LocationSourceError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationSourceError {
    /// The source momentarily cannot produce a reading.
    /// More readings may still follow.
    #[error("location temporarily unavailable")]
    TemporarilyUnavailable,
    /// The source cannot continue to deliver readings.
    #[error("location source failed: {0}")]
    Fatal(String),
}

impl LocationSourceError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Callback handle the source pushes updates through.
pub type UpdateSink = Box<dyn FnMut(LocationUpdate) + Send>;

#[derive(Debug, Error)]
#[error("the location service is unavailable: {0}")]
pub struct StartUpdatesError(pub String);

/// A push-based stream of readings. The consumer never pulls; the
/// source delivers updates through the sink until it is stopped.
pub trait LocationSource {
    fn start_updates(&mut self, sink: UpdateSink) -> Result<(), StartUpdatesError>;

    /// Idempotent. Updates already in flight may still be delivered
    /// afterwards and must be ignored by the consumer.
    fn stop_updates(&mut self);
}

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use serde::Deserialize;

use geomark_core::{
    entities::{Accuracy, MapPoint, Reading, Timestamp},
    gateways::location::{
        LocationSource, LocationSourceError, LocationUpdate, StartUpdatesError, UpdateSink,
    },
};

/// Replays recorded location updates from a JSON-lines file, for
/// headless operation and tests.
///
/// One update per line:
///
/// ```json
/// {"lat": 48.7755, "lng": 9.1827, "accuracy": 35.0, "after_ms": 1200}
/// {"error": "transient"}
/// ```
///
/// `after_ms` delays the delivery of the update it appears on.
/// Readings are stamped with the wall clock at delivery time.
pub struct ReplayLocationSource {
    path: PathBuf,
    worker: Option<thread::JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
}

impl ReplayLocationSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            worker: None,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default)]
    after_ms: Option<u64>,
    #[serde(default)]
    error: Option<RawError>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawError {
    Transient,
    Fatal,
}

impl RawUpdate {
    fn into_update(self, recorded_at: Timestamp) -> Option<LocationUpdate> {
        if let Some(error) = self.error {
            let err = match error {
                RawError::Transient => LocationSourceError::TemporarilyUnavailable,
                RawError::Fatal => LocationSourceError::Fatal("replayed source failure".into()),
            };
            return Some(LocationUpdate::Failed(err));
        }
        let pos = MapPoint::try_from_lat_lng_deg(self.lat?, self.lng?)?;
        let accuracy = Accuracy::from_meters(self.accuracy?);
        Some(LocationUpdate::Reading(Reading {
            pos,
            accuracy,
            recorded_at,
        }))
    }
}

impl LocationSource for ReplayLocationSource {
    fn start_updates(&mut self, mut sink: UpdateSink) -> Result<(), StartUpdatesError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let file = File::open(&self.path)
            .map_err(|err| StartUpdatesError(format!("{}: {err}", self.path.display())))?;
        self.stopped.store(false, Ordering::SeqCst);
        let stopped = Arc::clone(&self.stopped);
        let worker = thread::spawn(move || {
            for line in BufReader::new(file).lines() {
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        log::warn!("Failed to read replay line: {err}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let raw: RawUpdate = match serde_json::from_str(&line) {
                    Ok(raw) => raw,
                    Err(err) => {
                        log::warn!("Skipping malformed replay line: {err}");
                        continue;
                    }
                };
                if let Some(after_ms) = raw.after_ms {
                    thread::sleep(Duration::from_millis(after_ms));
                }
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                match raw.into_update(Timestamp::now()) {
                    Some(update) => sink(update),
                    None => log::warn!("Skipping incomplete replay line"),
                }
            }
        });
        self.worker = Some(worker);
        Ok(())
    }

    fn stop_updates(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            // The worker only sleeps between updates; joining keeps
            // the shutdown deterministic.
            if worker.join().is_err() {
                log::warn!("Replay worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Write, sync::Mutex};

    fn parse(line: &str) -> Option<LocationUpdate> {
        let raw: RawUpdate = serde_json::from_str(line).unwrap();
        raw.into_update(Timestamp::from_seconds(100))
    }

    #[test]
    fn parse_reading_line() {
        let update = parse(r#"{"lat": 48.7755, "lng": 9.1827, "accuracy": 35.0}"#).unwrap();
        let LocationUpdate::Reading(reading) = update else {
            panic!("expected a reading");
        };
        assert_eq!(MapPoint::from_lat_lng_deg(48.7755, 9.1827), reading.pos);
        assert_eq!(35.0, reading.accuracy.to_meters());
        assert_eq!(Timestamp::from_seconds(100), reading.recorded_at);
    }

    #[test]
    fn parse_error_lines() {
        assert_eq!(
            Some(LocationUpdate::Failed(
                LocationSourceError::TemporarilyUnavailable
            )),
            parse(r#"{"error": "transient"}"#)
        );
        assert!(matches!(
            parse(r#"{"error": "fatal"}"#),
            Some(LocationUpdate::Failed(LocationSourceError::Fatal(_)))
        ));
    }

    #[test]
    fn incomplete_lines_yield_nothing() {
        assert_eq!(None, parse(r#"{"lat": 48.7755}"#));
        assert_eq!(None, parse(r#"{"lat": 91.0, "lng": 0.0, "accuracy": 1.0}"#));
    }

    #[test]
    fn replay_a_recorded_file() {
        let path = std::env::temp_dir().join(format!(
            "geomark-replay-test-{}.jsonl",
            std::process::id()
        ));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, r#"{{"lat": 48.7755, "lng": 9.1827, "accuracy": 50.0}}"#).unwrap();
            writeln!(file, r#"{{"error": "transient"}}"#).unwrap();
            writeln!(file, r#"{{"lat": 48.7756, "lng": 9.1828, "accuracy": 10.0}}"#).unwrap();
        }

        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink_target = Arc::clone(&collected);
        let mut source = ReplayLocationSource::new(&path);
        source
            .start_updates(Box::new(move |update| {
                sink_target.lock().unwrap().push(update);
            }))
            .unwrap();

        // The file is short and contains no delays.
        for _ in 0..100 {
            if collected.lock().unwrap().len() == 3 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        source.stop_updates();
        let updates = collected.lock().unwrap();
        assert_eq!(3, updates.len());
        assert!(matches!(updates[0], LocationUpdate::Reading(_)));
        assert_eq!(
            LocationUpdate::Failed(LocationSourceError::TemporarilyUnavailable),
            updates[1]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_fails_to_start() {
        let mut source = ReplayLocationSource::new("/nonexistent/readings.jsonl");
        assert!(source.start_updates(Box::new(|_| {})).is_err());
    }
}

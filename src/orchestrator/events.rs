//! Transition events and the listener registry.
//!
//! Listeners are called synchronously, in registration order, after every
//! transition. Each call is isolated: an error or a panic is logged and
//! counted, and the remaining listeners still run.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use glam::DVec3;
use log::warn;
use serde::Serialize;

use super::state::FallState;
use super::summary::SessionSummary;
use crate::error::ListenerError;
use crate::prediction::Prediction;

/// Snapshot delivered to listeners for every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    /// State left.
    pub from: FallState,
    /// State entered.
    pub to: FallState,
    /// Why the transition happened.
    pub reason: String,
    /// Entity position, absent when the entity was unavailable.
    pub position: Option<DVec3>,
    /// Entity velocity, absent when the entity was unavailable.
    pub velocity: Option<DVec3>,
    /// Prediction current at the transition.
    pub prediction: Option<Prediction>,
    /// Clock time of the transition.
    pub timestamp: Duration,
}

/// Observer of orchestrator transitions.
///
/// [`on_transition`](Self::on_transition) runs for every change; the
/// destination-specific callback runs straight after it. Every method
/// defaults to doing nothing.
pub trait StateChangeListener {
    /// Called for every transition.
    fn on_transition(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        let _ = change;
        Ok(())
    }

    /// Called on entering `FALL_DETECTED`.
    fn on_fall_detected(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        let _ = change;
        Ok(())
    }

    /// Called on entering `TRACKING_FALL`.
    fn on_tracking_fall(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        let _ = change;
        Ok(())
    }

    /// Called on entering `READY_TO_PLACE`.
    fn on_ready_to_place(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        let _ = change;
        Ok(())
    }

    /// Called on entering `WATER_PLACED`.
    fn on_water_placed(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        let _ = change;
        Ok(())
    }

    /// Called on entering `FALL_ENDED`, with the finished session's summary.
    fn on_fall_ended(
        &mut self,
        change: &StateChange,
        summary: &SessionSummary,
    ) -> Result<(), ListenerError> {
        let _ = (change, summary);
        Ok(())
    }

    /// Called on returning to `IDLE`.
    fn on_idle(&mut self, change: &StateChange) -> Result<(), ListenerError> {
        let _ = change;
        Ok(())
    }
}

/// Handle returned by listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    name: String,
    listener: Box<dyn StateChangeListener + Send>,
}

#[derive(Default)]
pub(super) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<Registration>,
}

impl ListenerRegistry {
    pub(super) fn add(
        &mut self,
        name: impl Into<String>,
        listener: Box<dyn StateChangeListener + Send>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Registration {
            id,
            name: name.into(),
            listener,
        });
        id
    }

    pub(super) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Notifies every listener, returning the number of faults.
    pub(super) fn notify(&mut self, change: &StateChange, summary: Option<&SessionSummary>) -> u64 {
        let mut faults = 0;
        for entry in &mut self.entries {
            let listener = entry.listener.as_mut();
            if !isolate(&entry.name, || listener.on_transition(change)) {
                faults += 1;
            }
            if !isolate(&entry.name, || dispatch(listener, change, summary)) {
                faults += 1;
            }
        }
        faults
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.name))
            .finish()
    }
}

fn dispatch(
    listener: &mut (dyn StateChangeListener + Send),
    change: &StateChange,
    summary: Option<&SessionSummary>,
) -> Result<(), ListenerError> {
    match change.to {
        FallState::Idle => listener.on_idle(change),
        FallState::FallDetected => listener.on_fall_detected(change),
        FallState::TrackingFall => listener.on_tracking_fall(change),
        FallState::ReadyToPlace => listener.on_ready_to_place(change),
        FallState::WaterPlaced => listener.on_water_placed(change),
        FallState::FallEnded => match summary {
            Some(summary) => listener.on_fall_ended(change, summary),
            None => Ok(()),
        },
    }
}

/// Runs one callback, reporting whether it completed cleanly.
fn isolate<F>(name: &str, callback: F) -> bool
where
    F: FnOnce() -> Result<(), ListenerError>,
{
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!("{err}");
            false
        }
        Err(payload) => {
            warn!("listener `{name}` panicked: {}", panic_message(payload.as_ref()));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    fn change(to: FallState) -> StateChange {
        StateChange {
            from: FallState::Idle,
            to,
            reason: "test".to_owned(),
            position: None,
            velocity: None,
            prediction: None,
            timestamp: Duration::ZERO,
        }
    }

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl StateChangeListener for Log {
        fn on_transition(&mut self, change: &StateChange) -> Result<(), ListenerError> {
            if let Ok(mut log) = self.0.lock() {
                log.push(format!("any {}", change.to));
            }
            Ok(())
        }

        fn on_fall_detected(&mut self, _change: &StateChange) -> Result<(), ListenerError> {
            if let Ok(mut log) = self.0.lock() {
                log.push("detected".to_owned());
            }
            Ok(())
        }
    }

    struct Broken;

    impl StateChangeListener for Broken {
        fn on_transition(&mut self, _change: &StateChange) -> Result<(), ListenerError> {
            Err(ListenerError::new("broken", "always fails"))
        }

        fn on_fall_detected(&mut self, _change: &StateChange) -> Result<(), ListenerError> {
            panic!("boom");
        }
    }

    #[rstest]
    fn specialised_callback_follows_generic_one() {
        let log = Log::default();
        let mut registry = ListenerRegistry::default();
        registry.add("log", Box::new(log.clone()));
        assert_eq!(registry.notify(&change(FallState::FallDetected), None), 0);
        assert_eq!(
            *log.0.lock().expect("log lock"),
            vec!["any FALL_DETECTED".to_owned(), "detected".to_owned()]
        );
    }

    #[rstest]
    fn faults_are_counted_and_contained() {
        let log = Log::default();
        let mut registry = ListenerRegistry::default();
        registry.add("broken", Box::new(Broken));
        registry.add("log", Box::new(log.clone()));
        assert_eq!(registry.notify(&change(FallState::FallDetected), None), 2);
        assert_eq!(log.0.lock().expect("log lock").len(), 2);
    }

    #[rstest]
    fn removed_listeners_stop_hearing() {
        let log = Log::default();
        let mut registry = ListenerRegistry::default();
        let id = registry.add("log", Box::new(log.clone()));
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        registry.notify(&change(FallState::Idle), None);
        assert!(log.0.lock().expect("log lock").is_empty());
        assert_eq!(registry.len(), 0);
    }
}

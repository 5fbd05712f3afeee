//! Session recorder for capturing provider updates
//!
//! The recorder owns at most one in-progress [`Session`]. All appends and the
//! final detach go through one `parking_lot::Mutex`, so a frame either lands
//! in the session before it is handed out by [`SessionRecorder::stop`] or is
//! dropped because the session is already gone. Nothing is appended to a
//! session after it was returned.
//!
//! Provider updates are consumed by a single observer thread subscribed to
//! the [`TrackingFeed`]. On stop the observer drains every update already
//! queued on its channel before the session is detached.

use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use super::storage;
use super::types::{Frame, Session};
use crate::config::{RecorderConfig, StorageConfig};
use crate::error::SaveError;
use crate::provider::{ProviderEvent, ProviderFailure, ProviderUpdate, TrackingFeed};
use crate::taxonomy::{self, NativeTarget};
use crate::types::{RecorderState, Transform};

#[derive(Debug, Default)]
struct RecordingSlot {
    session: Option<Session>,
    started_at: Option<Instant>,
    last_failure: Option<ProviderFailure>,
    dropped_targets: u64,
    max_frames: usize,
    capped: bool,
}

impl RecordingSlot {
    /// Append a converted frame; returns false when not recording or capped
    fn append(&mut self, transforms: &HashMap<NativeTarget, Transform>, at: Instant) -> bool {
        let (Some(session), Some(started_at)) = (self.session.as_mut(), self.started_at) else {
            return false;
        };

        if self.max_frames > 0 && session.frames.len() >= self.max_frames {
            if !self.capped {
                tracing::warn!(
                    "Recording reached max_frames = {}, dropping further updates",
                    self.max_frames
                );
                self.capped = true;
            }
            return false;
        }

        let converted = taxonomy::convert_snapshot(transforms);
        self.dropped_targets += converted.rejected_count() as u64;

        // Provider timestamps can arrive slightly out of order; frame times never decrease
        let elapsed = at.saturating_duration_since(started_at).as_secs_f64();
        let time = session.frames.last().map_or(elapsed, |last| elapsed.max(last.time));

        session.frames.push(Frame::new(time, converted.transforms));
        true
    }
}

/// Appends frames to the recorder's current session from any thread
///
/// Obtained from [`SessionRecorder::appender`].
#[derive(Debug, Clone)]
pub struct FrameAppender {
    slot: Arc<Mutex<RecordingSlot>>,
}

impl FrameAppender {
    /// Append a snapshot taken now
    pub fn append(&self, transforms: &HashMap<NativeTarget, Transform>) -> bool {
        self.append_at(transforms, Instant::now())
    }

    /// Append a snapshot taken at `at`; returns whether it landed in a session
    pub fn append_at(&self, transforms: &HashMap<NativeTarget, Transform>, at: Instant) -> bool {
        self.slot.lock().append(transforms, at)
    }
}

struct Observer {
    stop_tx: Sender<()>,
    thread: thread::JoinHandle<()>,
}

/// Session recorder for capturing live tracking data
pub struct SessionRecorder {
    feed: TrackingFeed,
    config: RecorderConfig,
    slot: Arc<Mutex<RecordingSlot>>,
    observer: Option<Observer>,
}

impl std::fmt::Debug for SessionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecorder")
            .field("state", &self.state())
            .field("frames", &self.frame_count())
            .field("observing", &self.observer.is_some())
            .finish()
    }
}

impl SessionRecorder {
    /// Create a recorder observing `feed` with default settings
    pub fn new(feed: TrackingFeed) -> Self {
        Self::with_config(feed, RecorderConfig::default())
    }

    pub fn with_config(feed: TrackingFeed, config: RecorderConfig) -> Self {
        Self {
            feed,
            config,
            slot: Arc::new(Mutex::new(RecordingSlot::default())),
            observer: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> RecorderState {
        if self.slot.lock().session.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    /// Check if recording
    pub fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    /// Number of frames in the current session (0 when idle)
    pub fn frame_count(&self) -> usize {
        self.slot.lock().session.as_ref().map_or(0, |s| s.frames.len())
    }

    /// Instant the current recording started
    pub fn started_at(&self) -> Option<Instant> {
        self.slot.lock().started_at
    }

    /// Last failure reported by the provider during this recorder's lifetime
    pub fn last_provider_failure(&self) -> Option<ProviderFailure> {
        self.slot.lock().last_failure.clone()
    }

    /// Provider entries dropped this recording: no canonical target, or a
    /// non-finite transform
    pub fn dropped_targets(&self) -> u64 {
        self.slot.lock().dropped_targets
    }

    /// Handle for appending frames from other threads
    pub fn appender(&self) -> FrameAppender {
        FrameAppender {
            slot: self.slot.clone(),
        }
    }

    /// Start a new recording and begin observing the provider
    ///
    /// Ignored with a warning if already recording.
    pub fn start(&mut self) {
        {
            let mut slot = self.slot.lock();
            if slot.session.is_some() {
                tracing::warn!("start() called while already recording; ignoring");
                return;
            }
            slot.session = Some(Session::starting_now());
            slot.started_at = Some(Instant::now());
            slot.dropped_targets = 0;
            slot.max_frames = self.config.max_frames;
            slot.capped = false;
        }

        let events = self.feed.subscribe_blocking(self.config.channel_capacity);
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let slot = self.slot.clone();
        let thread = thread::spawn(move || observe(events, stop_rx, slot));
        self.observer = Some(Observer { stop_tx, thread });

        tracing::info!("Recording started");
    }

    /// Append a snapshot taken now, as if the provider had delivered it
    pub fn append(&self, transforms: &HashMap<NativeTarget, Transform>) -> bool {
        self.appender().append(transforms)
    }

    /// Append a snapshot taken at `at`
    pub fn append_at(&self, transforms: &HashMap<NativeTarget, Transform>, at: Instant) -> bool {
        self.appender().append_at(transforms, at)
    }

    /// Stop recording and hand over the session
    ///
    /// Never fails. When idle, returns an empty session starting now.
    pub fn stop(&mut self) -> Session {
        self.stop_observer();

        let mut slot = self.slot.lock();
        slot.started_at = None;
        match slot.session.take() {
            Some(session) => {
                tracing::info!(
                    "Recording stopped: {} frames over {:.2}s ({} targets dropped)",
                    session.frame_count(),
                    session.duration(),
                    slot.dropped_targets
                );
                session
            }
            None => Session::starting_now(),
        }
    }

    /// Stop recording and write the session into `dir`
    ///
    /// The recorder is idle either way. On a write failure the session comes
    /// back inside the [`SaveError`].
    pub fn stop_and_save(
        &mut self,
        dir: &Path,
        storage_config: &StorageConfig,
    ) -> std::result::Result<(PathBuf, Session), SaveError> {
        let session = self.stop();
        match storage::write_session(dir, &session, storage_config) {
            Ok(path) => Ok((path, session)),
            Err(error) => {
                tracing::error!("Could not save recording to {:?}: {}", dir, error);
                Err(SaveError { error, session })
            }
        }
    }

    fn stop_observer(&mut self) {
        if let Some(observer) = self.observer.take() {
            drop(observer.stop_tx);
            if observer.thread.join().is_err() {
                tracing::error!("Recorder observer thread panicked");
            }
        }
    }
}

impl Drop for SessionRecorder {
    fn drop(&mut self) {
        self.stop_observer();
    }
}

fn observe(events: Receiver<ProviderEvent>, stop: Receiver<()>, slot: Arc<Mutex<RecordingSlot>>) {
    loop {
        select! {
            recv(events) -> event => match event {
                Ok(event) => handle_event(&slot, event),
                Err(_) => {
                    tracing::debug!("Tracking feed closed");
                    break;
                }
            },
            recv(stop) -> _ => {
                for event in events.try_iter() {
                    handle_event(&slot, event);
                }
                break;
            }
        }
    }
}

fn handle_event(slot: &Mutex<RecordingSlot>, event: ProviderEvent) {
    match event {
        ProviderEvent::Update(ProviderUpdate { transforms, at }) => {
            slot.lock().append(&transforms, at);
        }
        ProviderEvent::Failure(failure) => {
            tracing::warn!("Provider failure while recording: {}", failure);
            slot.lock().last_failure = Some(failure);
        }
    }
}

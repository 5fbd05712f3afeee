//! Session player for replaying recorded sessions
//!
//! Playback reproduces exactly the recorded frames at the recorded
//! inter-frame intervals: no interpolation, looping, or seeking. Each
//! [`SessionPlayer::play`] runs one tokio task; starting another playback
//! cancels that task and awaits its termination before the new schedule
//! publishes anything, so the most recent `play` wins exclusively.
//!
//! # Observing playback
//!
//! - [`SessionPlayer::subscribe`] - `watch` receiver of the current
//!   [`PlaybackSnapshot`] (index, range, transforms); intermediate values
//!   may be coalesced, like any `watch` channel
//! - [`SessionPlayer::events`] - `broadcast` receiver of every
//!   [`PlaybackEvent`], one per published frame
//!
//! The player must be driven from within a tokio runtime.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::types::Session;
use crate::taxonomy::CanonicalTarget;
use crate::types::{PlayerState, Transform};

/// Capacity of the playback event channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Current observable playback state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub state: PlayerState,
    /// Index of the frame last published, while playing
    pub index: Option<usize>,
    /// Valid index range `0..frame_count`, while playing
    pub range: Option<Range<usize>>,
    /// Transforms of the frame last published; kept after playback ends
    pub transforms: BTreeMap<CanonicalTarget, Transform>,
    /// Playback the snapshot belongs to (0 before the first playback)
    pub generation: u64,
}

/// Event emitted by the playback schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started { generation: u64, frame_count: usize },
    Frame { generation: u64, index: usize },
    Finished { generation: u64 },
    Cancelled { generation: u64 },
}

impl PlaybackEvent {
    pub fn generation(&self) -> u64 {
        match self {
            PlaybackEvent::Started { generation, .. }
            | PlaybackEvent::Frame { generation, .. }
            | PlaybackEvent::Finished { generation }
            | PlaybackEvent::Cancelled { generation } => *generation,
        }
    }
}

/// Delay between two frames; negative or non-finite deltas become zero
pub fn frame_delay(time: f64, next_time: f64) -> Duration {
    let delta = next_time - time;
    if delta.is_finite() && delta > 0.0 {
        Duration::try_from_secs_f64(delta).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

struct PlaybackTask {
    generation: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Clone)]
struct Publisher {
    state_tx: watch::Sender<PlaybackSnapshot>,
    events_tx: broadcast::Sender<PlaybackEvent>,
}

impl Publisher {
    fn emit(&self, event: PlaybackEvent) {
        // No listeners is fine
        let _ = self.events_tx.send(event);
    }

    fn publish_frame(&self, session: &Session, index: usize, generation: u64) {
        let frame = &session.frames[index];
        self.state_tx.send_replace(PlaybackSnapshot {
            state: PlayerState::Playing,
            index: Some(index),
            range: Some(0..session.frames.len()),
            transforms: frame.transforms.clone(),
            generation,
        });
        self.emit(PlaybackEvent::Frame { generation, index });
    }

    fn go_idle(&self) {
        self.state_tx.send_modify(|snapshot| {
            snapshot.state = PlayerState::Idle;
            snapshot.index = None;
            snapshot.range = None;
        });
    }
}

/// Session player publishing frames at the recorded cadence
pub struct SessionPlayer {
    publisher: Publisher,
    current: Option<PlaybackTask>,
    generation: u64,
}

impl Default for SessionPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.publisher.state_tx.borrow();
        f.debug_struct("SessionPlayer")
            .field("state", &snapshot.state)
            .field("index", &snapshot.index)
            .field("generation", &self.generation)
            .finish()
    }
}

impl SessionPlayer {
    /// Create a new idle player
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(PlaybackSnapshot::default());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            publisher: Publisher {
                state_tx,
                events_tx,
            },
            current: None,
            generation: 0,
        }
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.publisher.state_tx.subscribe()
    }

    /// Subscribe to every playback event from now on
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.publisher.events_tx.subscribe()
    }

    /// Clone of the current snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.publisher.state_tx.borrow().clone()
    }

    /// Get current state
    pub fn state(&self) -> PlayerState {
        self.publisher.state_tx.borrow().state
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    /// Get current frame index
    pub fn current_index(&self) -> Option<usize> {
        self.publisher.state_tx.borrow().index
    }

    /// Valid frame range of the running playback
    pub fn current_range(&self) -> Option<Range<usize>> {
        self.publisher.state_tx.borrow().range.clone()
    }

    /// Replay `session`, preempting any playback in progress
    ///
    /// An empty session is ignored. Frame 0 is published before this
    /// returns; later frames follow on a spawned task.
    pub async fn play(&mut self, session: Arc<Session>) {
        if session.frames.is_empty() {
            tracing::debug!("Ignoring play() of an empty session");
            return;
        }

        self.cancel_current().await;

        self.generation += 1;
        let generation = self.generation;
        tracing::info!(
            "Playing session from {} ({} frames, {:.2}s)",
            session.start,
            session.frame_count(),
            session.duration()
        );

        self.publisher.emit(PlaybackEvent::Started {
            generation,
            frame_count: session.frames.len(),
        });
        self.publisher.publish_frame(&session, 0, generation);

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_schedule(
            session,
            generation,
            token.clone(),
            self.publisher.clone(),
        ));
        self.current = Some(PlaybackTask {
            generation,
            token,
            handle,
        });
    }

    /// Cancel playback and return to idle
    pub async fn stop(&mut self) {
        self.cancel_current().await;
        if self.is_playing() {
            self.publisher.go_idle();
        }
    }

    /// Wait until the running playback finishes on its own or is cancelled
    pub async fn wait(&mut self) {
        if let Some(task) = self.current.take() {
            if let Err(e) = task.handle.await {
                tracing::error!("Playback task {} failed: {}", task.generation, e);
            }
        }
    }

    async fn cancel_current(&mut self) {
        if let Some(task) = self.current.take() {
            task.token.cancel();
            if let Err(e) = task.handle.await {
                tracing::error!("Playback task {} failed: {}", task.generation, e);
            }
        }
    }
}

impl Drop for SessionPlayer {
    fn drop(&mut self) {
        if let Some(task) = self.current.take() {
            task.token.cancel();
        }
    }
}

async fn run_schedule(session: Arc<Session>, generation: u64, token: CancellationToken, publisher: Publisher) {
    let mut index = 0;
    loop {
        let next = index + 1;
        if next >= session.frames.len() {
            publisher.go_idle();
            publisher.emit(PlaybackEvent::Finished { generation });
            tracing::debug!("Playback {} finished", generation);
            return;
        }

        let delay = frame_delay(session.frames[index].time, session.frames[next].time);
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                publisher.emit(PlaybackEvent::Cancelled { generation });
                tracing::debug!("Playback {} cancelled at frame {}", generation, index);
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        index = next;
        publisher.publish_frame(&session, index, generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::Frame;
    use tokio::time::Instant;

    fn session_with_times(times: &[f64]) -> Arc<Session> {
        let mut session = Session::starting_now();
        for &t in times {
            session.frames.push(Frame::empty(t));
        }
        Arc::new(session)
    }

    #[test]
    fn test_frame_delay_clamps() {
        assert_eq!(frame_delay(0.0, 0.5), Duration::from_millis(500));
        assert_eq!(frame_delay(0.5, 0.2), Duration::ZERO);
        assert_eq!(frame_delay(0.5, 0.5), Duration::ZERO);
        assert_eq!(frame_delay(0.0, f64::NAN), Duration::ZERO);
        assert_eq!(frame_delay(0.0, f64::INFINITY), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_empty_session_is_ignored() {
        let mut player = SessionPlayer::new();
        let mut events = player.events();
        player.play(session_with_times(&[])).await;
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_frame_published_immediately() {
        let mut player = SessionPlayer::new();
        player.play(session_with_times(&[0.0, 1.0])).await;

        let snapshot = player.snapshot();
        assert_eq!(snapshot.state, PlayerState::Playing);
        assert_eq!(snapshot.index, Some(0));
        assert_eq!(snapshot.range, Some(0..2));
        assert_eq!(snapshot.generation, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_idle() {
        let mut player = SessionPlayer::new();
        let mut events = player.events();
        player.play(session_with_times(&[0.0, 0.1, 0.2])).await;
        player.wait().await;

        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.current_index(), None);
        assert_eq!(player.current_range(), None);

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                PlaybackEvent::Started { generation: 1, frame_count: 3 },
                PlaybackEvent::Frame { generation: 1, index: 0 },
                PlaybackEvent::Frame { generation: 1, index: 1 },
                PlaybackEvent::Frame { generation: 1, index: 2 },
                PlaybackEvent::Finished { generation: 1 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_times_clamp_to_zero() {
        let mut player = SessionPlayer::new();
        let started = Instant::now();
        player.play(session_with_times(&[0.0, 0.5, 0.2, 0.3])).await;
        player.wait().await;

        // 0.5 + 0 (clamped) + 0.1
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(600), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(610), "elapsed {:?}", elapsed);
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels() {
        let mut player = SessionPlayer::new();
        let mut events = player.events();
        player.play(session_with_times(&[0.0, 10.0])).await;
        player.stop().await;

        assert_eq!(player.state(), PlayerState::Idle);
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen.last(), Some(&PlaybackEvent::Cancelled { generation: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_frame_session() {
        let mut player = SessionPlayer::new();
        player.play(session_with_times(&[0.0])).await;
        player.wait().await;
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.snapshot().generation, 1);
    }
}

//! Session recording and playback module
//!
//! A [`Session`] is an ordered list of timestamped [`Frame`]s, each holding
//! the canonical transforms observed at that instant.
//!
//! # Features
//!
//! - Record provider updates into a session with elapsed-time stamps
//! - Persist sessions as JSON files keyed by canonical target tags
//! - List the sessions in a folder, skipping files that fail to decode
//! - Replay a session at its recorded cadence, one playback at a time

pub mod catalog;
pub mod codec;
pub mod player;
pub mod recorder;
pub mod storage;
pub mod types;

pub use catalog::{CatalogEntry, CatalogFailure, ReloadReport, SessionCatalog};
pub use player::{frame_delay, PlaybackEvent, PlaybackSnapshot, SessionPlayer};
pub use recorder::{FrameAppender, SessionRecorder};
pub use storage::{read_session, session_filename, write_session};
pub use types::{Frame, Session, SessionSummary};

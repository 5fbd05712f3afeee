//! # anchor-replay: record and replay tracked anchor transforms
//!
//! Captures the head and hand transforms reported by a tracking provider into
//! sessions, persists them, and replays them at their recorded cadence.
//!
//! ## Architecture
//!
//! - **Taxonomy**: maps the provider's native target identifiers onto a fixed,
//!   serializable set of 65 canonical targets
//! - **Provider**: the push feed a tracking subsystem publishes snapshots into
//! - **Session**: the data model, its JSON codec, the recorder, the player and
//!   the catalog of saved sessions
//! - **Communication**: crossbeam channels from the provider to the recorder;
//!   tokio `watch`/`broadcast` channels from the player to its consumers
//!
//! ## Configuration
//!
//! Settings are read from `config.toml` in the platform config directory
//! under `dev.anchor-replay`; recordings default to the platform cache
//! directory. See [`config`].
//!
//! ## Example
//!
//! ```ignore
//! use anchor_replay::{
//!     config::AppConfig,
//!     provider::{MockProvider, TrackingFeed},
//!     session::{SessionCatalog, SessionPlayer, SessionRecorder},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anchor_replay::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let dir = config.storage.resolved_recordings_dir()?;
//!
//!     let feed = TrackingFeed::new();
//!     let provider = MockProvider::new(feed.clone()).start();
//!     let mut recorder = SessionRecorder::with_config(feed, config.recorder.clone());
//!     recorder.start();
//!     std::thread::sleep(std::time::Duration::from_secs(2));
//!     let (path, _) = recorder.stop_and_save(&dir, &config.storage)?;
//!     provider.stop();
//!
//!     let catalog = SessionCatalog::from_config(&config.storage)?;
//!     let mut player = SessionPlayer::new();
//!     player.play(Arc::new(catalog.load(&path)?)).await;
//!     player.wait().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod session;
pub mod taxonomy;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AnchorError, Result, ResultExt, SaveError};
pub use provider::{ProviderEvent, ProviderFailure, ProviderUpdate, TrackingFeed};
pub use session::{Frame, Session, SessionCatalog, SessionPlayer, SessionRecorder};
pub use taxonomy::{CanonicalTarget, NativeTarget};
pub use types::{PlayerState, RecorderState, Transform};

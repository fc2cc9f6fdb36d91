//! Realtime feed client
//!
//! HTTP access to the realtime endpoints, per-stream cursors, and the
//! background poller that ties them together.

pub mod api;
pub mod config;
pub mod cursor;
pub mod error;
pub mod poller;
pub mod service;

pub use api::RealtimeApi;
pub use config::ClientConfig;
pub use cursor::CursorSnapshot;
pub use error::{ClientError, Result};
pub use poller::{FeedCallback, PollerState, RealtimeOptions, RealtimePoller};
pub use service::{CycleReport, FeedService, PollOutcome};

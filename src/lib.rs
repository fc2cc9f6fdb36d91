//! Client-side watcher for the job portal's realtime feeds.
//!
//! [`client::RealtimePoller`] polls the jobs, applications and notifications
//! streams on a fixed interval, tracking a `since` cursor per stream and
//! handing new items to per-stream callbacks.

pub mod app_init;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod event;
pub mod id;
pub mod logging;
pub mod result;
pub mod stores;

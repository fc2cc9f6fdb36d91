use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    client::{ClientConfig, RealtimeApi, RealtimePoller},
    config::WatchConfig,
    event::RealtimeEvent,
    logging::{LoggingConfig, init_logging},
    result::Result,
};

pub struct AppComponents {
    pub poller: RealtimePoller,
    pub sender: UnboundedSender<RealtimeEvent>,
    pub events: UnboundedReceiver<RealtimeEvent>,
    pub _log_guard: Option<WorkerGuard>,
}

/// Set up logging, the API client and an idle poller.
///
/// Must be called from within a Tokio runtime.
pub fn initialize_app(config: &WatchConfig, debug: bool) -> Result<AppComponents> {
    let log_guard = initialize_logging(config, debug)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.base_url,
        "jobwatch starting up"
    );

    let poller = create_poller(config.clone(), debug)?;
    let (sender, events) = unbounded_channel();

    Ok(AppComponents { poller, sender, events, _log_guard: log_guard })
}

fn initialize_logging(config: &WatchConfig, debug: bool) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_env();

    if let Some(log_level) = &config.log_level {
        logging_config = logging_config.with_level_name(log_level);
    }

    if debug {
        logging_config = logging_config.with_level_name("debug");
    }

    init_logging(logging_config)
}

fn create_poller(config: WatchConfig, debug: bool) -> Result<RealtimePoller> {
    let mut client_config = ClientConfig::from(config);
    if debug {
        client_config = client_config.with_debug_logging(true);
    }
    let api = Arc::new(RealtimeApi::new(client_config)?);

    Ok(RealtimePoller::new(api)?)
}

//! Background polling of the realtime feeds

use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use derive_builder::Builder;
use tokio::{
    runtime::Handle,
    sync::broadcast,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, instrument};

use super::{
    api::RealtimeApi,
    config::PollingConfig,
    cursor::CursorSnapshot,
    error::{ClientError, Result},
    service::FeedService,
};
use crate::{
    dispatcher::Dispatcher,
    domain::{ApplicationDto, JobDto, NotificationDto},
    event::RealtimeEvent,
    id::NotificationId,
};

/// Receives each non-empty batch of new items for one stream
pub type FeedCallback<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

/// Options for one polling run
#[derive(Clone, Builder)]
#[builder(pattern = "owned", default, build_fn(validate = "Self::validate"))]
pub struct RealtimeOptions {
    /// Delay between poll cycles
    interval: Duration,
    #[builder(setter(strip_option))]
    pub(crate) on_new_jobs: Option<FeedCallback<JobDto>>,
    #[builder(setter(strip_option))]
    pub(crate) on_new_applications: Option<FeedCallback<ApplicationDto>>,
    #[builder(setter(strip_option))]
    pub(crate) on_new_notifications: Option<FeedCallback<NotificationDto>>,
}

impl Default for RealtimeOptions {
    fn default() -> Self {
        Self {
            interval: PollingConfig::DEFAULT_INTERVAL,
            on_new_jobs: None,
            on_new_applications: None,
            on_new_notifications: None,
        }
    }
}

impl fmt::Debug for RealtimeOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RealtimeOptions")
            .field("interval", &self.interval)
            .field("on_new_jobs", &self.on_new_jobs.is_some())
            .field("on_new_applications", &self.on_new_applications.is_some())
            .field("on_new_notifications", &self.on_new_notifications.is_some())
            .finish()
    }
}

impl RealtimeOptionsBuilder {
    /// Set the interval in milliseconds
    pub fn interval_ms(self, millis: u64) -> Self {
        self.interval(Duration::from_millis(millis))
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self.interval {
            Some(interval) if interval.is_zero() => {
                Err("polling interval must be greater than zero".into())
            },
            _ => Ok(()),
        }
    }
}

impl RealtimeOptions {
    pub fn builder() -> RealtimeOptionsBuilder {
        RealtimeOptionsBuilder::default()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Options that forward every batch to `dispatcher` as a [`RealtimeEvent`]
    pub fn dispatching<D>(
        interval: Duration,
        dispatcher: D,
    ) -> std::result::Result<Self, RealtimeOptionsBuilderError>
    where
        D: Dispatcher + Clone + Send + Sync + 'static,
    {
        let jobs = dispatcher.clone();
        let applications = dispatcher.clone();
        let notifications = dispatcher;

        Self::builder()
            .interval(interval)
            .on_new_jobs(Arc::new(move |items: Vec<JobDto>| {
                jobs.dispatch(RealtimeEvent::from(items))
            }))
            .on_new_applications(Arc::new(move |items: Vec<ApplicationDto>| {
                applications.dispatch(RealtimeEvent::from(items))
            }))
            .on_new_notifications(Arc::new(move |items: Vec<NotificationDto>| {
                notifications.dispatch(RealtimeEvent::from(items))
            }))
            .build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Stopped,
    Running,
}

/// Spawns poll cycles for one run until closed
#[derive(Debug, Clone)]
struct CycleLauncher {
    handle: Handle,
    service: Arc<FeedService>,
    options: Arc<RealtimeOptions>,
    cycles: Arc<AtomicU64>,
    open: Arc<Mutex<bool>>,
}

impl CycleLauncher {
    fn new(poller: &RealtimePoller, options: RealtimeOptions) -> Self {
        Self {
            handle: poller.handle.clone(),
            service: Arc::clone(&poller.service),
            options: Arc::new(options),
            cycles: Arc::clone(&poller.cycles),
            open: Arc::new(Mutex::new(true)),
        }
    }

    /// Spawn one cycle; returns false once the launcher is closed
    fn launch(&self) -> bool {
        // held across the spawn so `close` cannot interleave
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if !*open {
            return false;
        }

        let cycle = self.cycles.fetch_add(1, Ordering::AcqRel) + 1;
        let service = Arc::clone(&self.service);
        let options = Arc::clone(&self.options);

        self.handle.spawn(async move {
            debug!(cycle, "Starting poll cycle");
            service.poll_all(&options).await;
        });
        true
    }

    fn close(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

/// Handles of the active run
#[derive(Debug)]
struct PollingRun {
    interval: Duration,
    launcher: CycleLauncher,
    shutdown_tx: broadcast::Sender<()>,
    ticker: JoinHandle<()>,
}

/// Poll scheduler for the realtime feeds
///
/// One immediate cycle on `start`, then one cycle per interval until `stop`.
/// Ticks are spaced by the interval rather than by cycle completion, so a
/// slow cycle may overlap the next one. Cursors live in the poller's
/// [`FeedService`] and survive a restart.
#[derive(Debug)]
pub struct RealtimePoller {
    service: Arc<FeedService>,
    handle: Handle,
    default_interval: Duration,
    run: Option<PollingRun>,
    cycles: Arc<AtomicU64>,
}

impl RealtimePoller {
    /// Create a poller bound to the current Tokio runtime
    pub fn new(api: Arc<RealtimeApi>) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| {
            ClientError::config("RealtimePoller must be created within a Tokio runtime context")
        })?;

        Ok(Self {
            default_interval: api.config().polling.interval,
            service: Arc::new(FeedService::new(api)),
            handle,
            run: None,
            cycles: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Start polling, restarting if already running
    ///
    /// The first cycle is launched before this returns.
    #[instrument(skip(self, options), fields(interval = ?options.interval))]
    pub fn start(&mut self, options: RealtimeOptions) {
        if self.run.is_some() {
            debug!("Poller already running, stopping previous run");
            self.stop();
        }

        let interval = options.interval;
        let launcher = CycleLauncher::new(self, options);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        launcher.launch();

        let ticker = {
            let launcher = launcher.clone();

            self.handle.spawn(async move {
                let mut ticks = time::interval_at(Instant::now() + interval, interval);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        biased;
                        _ = shutdown_rx.recv() => {
                            debug!("Ticker received shutdown signal");
                            break;
                        }
                        _ = ticks.tick() => {
                            if !launcher.launch() {
                                break;
                            }
                        }
                    }
                }

                debug!("Ticker loop ended");
            })
        };

        self.run = Some(PollingRun { interval, launcher, shutdown_tx, ticker });
        info!(interval_ms = interval.as_millis() as u64, "Started real-time polling");
    }

    /// Stop scheduling cycles; no-op when not running
    ///
    /// No cycle is launched after this returns. Cycles already in flight
    /// finish and still invoke their callbacks.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.launcher.close();
            let _ = run.shutdown_tx.send(());
            run.ticker.abort();
            info!("Stopped real-time polling");
        }
    }

    pub fn state(&self) -> PollerState {
        match self.run {
            Some(_) => PollerState::Running,
            None => PollerState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollerState::Running
    }

    /// Interval of the active run
    pub fn interval(&self) -> Option<Duration> {
        self.run.as_ref().map(|run| run.interval)
    }

    /// Polling interval from the client configuration
    pub fn default_interval(&self) -> Duration {
        self.default_interval
    }

    /// Number of cycles launched over the poller's lifetime
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    pub fn cursors(&self) -> CursorSnapshot {
        self.service.cursors()
    }

    pub fn unread_count(&self) -> Option<u64> {
        self.service.unread_count()
    }

    pub fn service(&self) -> &Arc<FeedService> {
        &self.service
    }

    /// See [`FeedService::mark_notifications_as_read`]
    pub async fn mark_notifications_as_read(&self, ids: &[NotificationId]) -> bool {
        self.service.mark_notifications_as_read(ids).await
    }

    pub async fn mark_all_notifications_as_read(&self) -> bool {
        self.service.mark_all_notifications_as_read().await
    }
}

impl Drop for RealtimePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

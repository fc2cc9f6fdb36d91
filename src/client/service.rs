//! Per-stream polling and notification acknowledgment

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, error, info, instrument, warn};

use super::{
    api::RealtimeApi,
    cursor::{CursorSnapshot, CursorStore},
    poller::{FeedCallback, RealtimeOptions},
};
use crate::{
    domain::{ApplicationDto, FeedItem, FeedStream, JobDto, NotificationDto},
    id::NotificationId,
};

const UNREAD_UNKNOWN: u64 = u64::MAX;

/// What happened to one stream during one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// New items were handed to the registered callback
    Delivered(usize),
    /// New items arrived but no callback was registered for the stream
    Unclaimed(usize),
    /// The server had nothing newer than the cursor
    Empty,
    /// Not authorized for this stream right now; cursor untouched
    Skipped,
    /// Transport, server or payload failure; cursor untouched
    Failed,
}

/// Outcome of one poll cycle across all streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub jobs: PollOutcome,
    pub applications: PollOutcome,
    pub notifications: PollOutcome,
}

impl CycleReport {
    pub fn get(&self, stream: FeedStream) -> PollOutcome {
        match stream {
            FeedStream::Jobs => self.jobs,
            FeedStream::Applications => self.applications,
            FeedStream::Notifications => self.notifications,
        }
    }
}

/// Fetches the realtime feeds against a shared cursor store
///
/// Each service owns its own cursors, so independent services never see each
/// other's progress.
#[derive(Debug)]
pub struct FeedService {
    api: Arc<RealtimeApi>,
    cursors: CursorStore,
    unread_count: AtomicU64,
}

impl FeedService {
    pub fn new(api: Arc<RealtimeApi>) -> Self {
        Self {
            api,
            cursors: CursorStore::new(),
            unread_count: AtomicU64::new(UNREAD_UNKNOWN),
        }
    }

    /// Run one poll cycle: all three streams concurrently, none waiting on another
    #[instrument(skip(self, options))]
    pub async fn poll_all(&self, options: &RealtimeOptions) -> CycleReport {
        let (jobs, applications, notifications) = tokio::join!(
            self.poll_jobs(options.on_new_jobs.as_ref()),
            self.poll_applications(options.on_new_applications.as_ref()),
            self.poll_notifications(options.on_new_notifications.as_ref()),
        );

        let report = CycleReport { jobs, applications, notifications };
        debug!(?report, "Poll cycle finished");
        report
    }

    pub async fn poll_jobs(&self, callback: Option<&FeedCallback<JobDto>>) -> PollOutcome {
        self.poll_stream(callback).await
    }

    /// Employer-only feed, job seekers get 401/403 and are skipped silently
    pub async fn poll_applications(
        &self,
        callback: Option<&FeedCallback<ApplicationDto>>,
    ) -> PollOutcome {
        self.poll_stream(callback).await
    }

    pub async fn poll_notifications(
        &self,
        callback: Option<&FeedCallback<NotificationDto>>,
    ) -> PollOutcome {
        self.poll_stream(callback).await
    }

    #[instrument(skip(self, callback), fields(stream = %T::STREAM))]
    async fn poll_stream<T: FeedItem>(&self, callback: Option<&FeedCallback<T>>) -> PollOutcome {
        let stream = T::STREAM;
        let since = self.cursors.get(stream);

        let page = match self.api.get_feed::<T>(since).await {
            Ok(page) => page,
            Err(e) if e.is_unauthorized_for(stream) => {
                debug!(since, status = ?e.status(), "Not authorized for stream, skipping cycle");
                return PollOutcome::Skipped;
            },
            Err(e) => {
                error!(error = %e, since, "Failed to poll stream");
                return PollOutcome::Failed;
            },
        };

        let cursor = self.cursors.advance(stream, page.last_id);
        if stream == FeedStream::Notifications
            && let Some(unread) = page.unread_count
        {
            self.unread_count.store(unread, Ordering::Release);
        }

        if page.items.is_empty() {
            debug!(since, cursor, "No new items");
            return PollOutcome::Empty;
        }

        let count = page.items.len();
        match callback {
            Some(callback) => {
                debug!(since, cursor, item_count = count, "Delivering new items");
                callback(page.items);
                PollOutcome::Delivered(count)
            },
            None => {
                debug!(
                    since,
                    cursor,
                    item_count = count,
                    "New items without a registered callback"
                );
                PollOutcome::Unclaimed(count)
            },
        }
    }

    /// Mark notifications as read on the server.
    ///
    /// Cursors are not touched: read state is tracked server side and is
    /// independent of what the poller has seen. Failures are logged and
    /// reported as `false`, never retried.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn mark_notifications_as_read(&self, ids: &[NotificationId]) -> bool {
        match self.api.mark_notifications_read(ids).await {
            Ok(()) => {
                info!("Marked notifications as read");
                true
            },
            Err(e) => {
                error!(error = %e, "Failed to mark notifications as read");
                false
            },
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_all_notifications_as_read(&self) -> bool {
        match self.api.mark_all_notifications_read().await {
            Ok(()) => {
                info!("Marked all notifications as read");
                self.unread_count.store(0, Ordering::Release);
                true
            },
            Err(e) => {
                warn!(error = %e, "Failed to mark all notifications as read");
                false
            },
        }
    }

    pub fn cursors(&self) -> CursorSnapshot {
        self.cursors.snapshot()
    }

    pub fn cursor(&self, stream: FeedStream) -> u64 {
        self.cursors.get(stream)
    }

    /// Unread count last reported by the notifications feed
    pub fn unread_count(&self) -> Option<u64> {
        match self.unread_count.load(Ordering::Acquire) {
            UNREAD_UNKNOWN => None,
            count => Some(count),
        }
    }

}

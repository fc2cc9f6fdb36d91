use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::{
    domain::{JobDto, NotificationDto},
    event::RealtimeEvent,
    id::{JobId, NotificationId},
};

/// Local view of the notifications delivered so far
#[derive(Debug, Default)]
pub struct NotificationInbox {
    notifications: Vec<NotificationDto>,
    notification_id_lookup: HashMap<NotificationId, usize>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, event), fields(event_type = %event.variant_name()))]
    pub fn apply(&mut self, event: &RealtimeEvent) {
        match event {
            RealtimeEvent::NotificationsReceived(notifications) => {
                debug!(count = notifications.len(), "Merging received notifications");
                notifications
                    .iter()
                    .cloned()
                    .for_each(|n| self.sync_notification(n));
            },

            RealtimeEvent::NotificationsRead(ids) => {
                for id in ids {
                    if let Some(notification) = self.find_mut(*id) {
                        notification.read = true;
                    }
                }
            },

            RealtimeEvent::AllNotificationsRead => {
                self.notifications
                    .iter_mut()
                    .for_each(|n| n.read = true);
            },
            _ => {},
        }
    }

    /// Notifications ordered newest first
    pub fn newest_first(&self) -> Vec<&NotificationDto> {
        self.notifications
            .iter()
            .sorted_by(|a, b| b.id.cmp(&a.id))
            .collect()
    }

    pub fn unread_ids(&self) -> Vec<NotificationId> {
        self.notifications
            .iter()
            .filter(|n| !n.read)
            .map(|n| n.id)
            .sorted()
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn find(&self, id: NotificationId) -> Option<&NotificationDto> {
        self.notification_id_lookup
            .get(&id)
            .map(|&idx| &self.notifications[idx])
    }

    fn find_mut(&mut self, id: NotificationId) -> Option<&mut NotificationDto> {
        self.notification_id_lookup
            .get(&id)
            .map(|&idx| &mut self.notifications[idx])
    }

    fn sync_notification(&mut self, notification: NotificationDto) {
        match self.find_mut(notification.id) {
            Some(existing) => *existing = notification,
            None => {
                self.notification_id_lookup
                    .insert(notification.id, self.notifications.len());
                self.notifications.push(notification);
            },
        }
    }
}

/// The most recently announced jobs, newest first
#[derive(Debug)]
pub struct RecentJobs {
    capacity: usize,
    jobs: Vec<JobDto>,
}

impl Default for RecentJobs {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl RecentJobs {
    pub const DEFAULT_CAPACITY: usize = 5;

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, jobs: Vec::with_capacity(capacity) }
    }

    pub fn apply(&mut self, event: &RealtimeEvent) {
        if let RealtimeEvent::JobsReceived(jobs) = event {
            self.jobs = std::mem::take(&mut self.jobs)
                .into_iter()
                .chain(jobs.iter().filter(|j| j.is_listed()).cloned())
                .sorted_by(|a, b| b.id.cmp(&a.id))
                .dedup_by(|a, b| a.id == b.id)
                .take(self.capacity)
                .collect();
        }
    }

    pub fn jobs(&self) -> &[JobDto] {
        &self.jobs
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|j| j.id).collect()
    }
}

#[instrument(skip(event))]
pub fn log_event(event: &RealtimeEvent) {
    match event {
        RealtimeEvent::JobsReceived(jobs) => {
            info!(count = jobs.len(), ids = %jobs.iter().map(|j| j.id).join(","), "New jobs posted")
        },
        RealtimeEvent::ApplicationsReceived(applications) => {
            info!(
                count = applications.len(),
                ids = %applications.iter().map(|a| a.id).join(","),
                "New applications received"
            )
        },
        RealtimeEvent::NotificationsReceived(notifications) => {
            info!(
                count = notifications.len(),
                unread = notifications.iter().filter(|n| !n.read).count(),
                "New notifications"
            )
        },
        RealtimeEvent::NotificationsRead(ids) => {
            debug!(ids = %ids.iter().join(","), "Notifications marked as read")
        },
        RealtimeEvent::AllNotificationsRead => debug!("All notifications marked as read"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use compact_str::format_compact;

    use super::*;

    fn notification(id: u64, read: bool) -> NotificationDto {
        NotificationDto {
            id: NotificationId::new(id),
            user_id: None,
            message: format_compact!("notification {id}"),
            kind: "application_status".into(),
            read,
            entity_id: None,
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 12, 9, 0, 0).unwrap()),
        }
    }

    fn job(id: u64) -> JobDto {
        JobDto {
            id: JobId::new(id),
            title: format_compact!("Job {id}"),
            ..JobDto::default()
        }
    }

    #[test]
    fn inbox_merges_by_id_and_orders_newest_first() {
        let mut inbox = NotificationInbox::new();

        inbox.apply(&RealtimeEvent::from(vec![notification(1, false), notification(3, false)]));
        inbox.apply(&RealtimeEvent::from(vec![notification(2, true), notification(3, true)]));

        let ids: Vec<u64> = inbox
            .newest_first()
            .iter()
            .map(|n| n.id.value())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(inbox.len(), 3);
        assert_eq!(inbox.unread_ids(), vec![NotificationId::new(1)]);
    }

    #[test]
    fn inbox_tracks_read_events() {
        let mut inbox = NotificationInbox::new();
        inbox.apply(&RealtimeEvent::from(vec![
            notification(1, false),
            notification(2, false),
            notification(3, false),
        ]));

        inbox.apply(&RealtimeEvent::NotificationsRead(vec![
            NotificationId::new(2),
            NotificationId::new(99),
        ]));
        assert_eq!(inbox.unread_count(), 2);
        assert!(inbox.find(NotificationId::new(2)).is_some_and(|n| n.read));

        inbox.apply(&RealtimeEvent::AllNotificationsRead);
        assert_eq!(inbox.unread_count(), 0);
        assert!(inbox.unread_ids().is_empty());
    }

    #[test]
    fn recent_jobs_keeps_newest_unique_listed_jobs() {
        let mut recent = RecentJobs::with_capacity(3);

        recent.apply(&RealtimeEvent::from(vec![job(1), job(2)]));
        let mut hidden = job(9);
        hidden.is_active = Some(false);
        recent.apply(&RealtimeEvent::from(vec![job(4), job(2), job(3), hidden]));

        assert_eq!(
            recent.ids(),
            vec![JobId::new(4), JobId::new(3), JobId::new(2)]
        );
    }

    #[test]
    fn recent_jobs_ignores_other_events() {
        let mut recent = RecentJobs::default();
        recent.apply(&RealtimeEvent::AllNotificationsRead);
        assert!(recent.jobs().is_empty());
    }
}

use crate::{
    domain::{ApplicationDto, JobDto, NotificationDto},
    id::NotificationId,
};

#[derive(Debug, Clone)]
pub enum RealtimeEvent {
    JobsReceived(Vec<JobDto>),
    ApplicationsReceived(Vec<ApplicationDto>),
    NotificationsReceived(Vec<NotificationDto>),
    NotificationsRead(Vec<NotificationId>),
    AllNotificationsRead,
}

impl RealtimeEvent {
    /// Get the variant name as a string slice (without "RealtimeEvent::" prefix)
    pub fn variant_name(&self) -> &'static str {
        match self {
            RealtimeEvent::JobsReceived(_) => "JobsReceived",
            RealtimeEvent::ApplicationsReceived(_) => "ApplicationsReceived",
            RealtimeEvent::NotificationsReceived(_) => "NotificationsReceived",
            RealtimeEvent::NotificationsRead(_) => "NotificationsRead",
            RealtimeEvent::AllNotificationsRead => "AllNotificationsRead",
        }
    }
}

impl From<Vec<JobDto>> for RealtimeEvent {
    fn from(jobs: Vec<JobDto>) -> Self {
        RealtimeEvent::JobsReceived(jobs)
    }
}

impl From<Vec<ApplicationDto>> for RealtimeEvent {
    fn from(applications: Vec<ApplicationDto>) -> Self {
        RealtimeEvent::ApplicationsReceived(applications)
    }
}

impl From<Vec<NotificationDto>> for RealtimeEvent {
    fn from(notifications: Vec<NotificationDto>) -> Self {
        RealtimeEvent::NotificationsReceived(notifications)
    }
}

impl From<Vec<NotificationId>> for RealtimeEvent {
    fn from(ids: Vec<NotificationId>) -> Self {
        RealtimeEvent::NotificationsRead(ids)
    }
}

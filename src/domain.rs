use std::fmt;

use chrono::{DateTime, Utc};
use compact_str::{CompactString, format_compact};
use serde::{Deserialize, de::DeserializeOwned};

use crate::id::{ApplicationId, EmployerId, JobId, JobSeekerId, NotificationId, UserId};

/// One of the three independent update feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedStream {
    Jobs,
    Applications,
    Notifications,
}

impl FeedStream {
    pub const ALL: [FeedStream; 3] = [
        FeedStream::Jobs,
        FeedStream::Applications,
        FeedStream::Notifications,
    ];

    /// Path segment under `/api/realtime/`
    pub fn path(&self) -> &'static str {
        match self {
            FeedStream::Jobs => "jobs",
            FeedStream::Applications => "applications",
            FeedStream::Notifications => "notifications",
        }
    }

    /// Statuses that mean "not authorized for this stream right now".
    ///
    /// The applications feed is employer-only, so a 403 there is expected for
    /// job seekers and is not worth reporting.
    pub fn is_unauthorized_status(&self, status: u16) -> bool {
        match self {
            FeedStream::Applications => status == 401 || status == 403,
            FeedStream::Jobs | FeedStream::Notifications => status == 401,
        }
    }
}

impl fmt::Display for FeedStream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// An item delivered by one of the realtime feeds
pub trait FeedItem: DeserializeOwned + Clone + Send + Sync + 'static {
    const STREAM: FeedStream;

    fn feed_id(&self) -> u64;
}

/// One page of new items as returned by `GET /api/realtime/<stream>?since=`
///
/// The server names the item array after the stream (`jobs`, `applications`,
/// `notifications`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct FeedPage<T> {
    #[serde(
        default,
        alias = "jobs",
        alias = "applications",
        alias = "notifications"
    )]
    pub items: Vec<T>,
    pub last_id: u64,
    /// Only reported by the notifications feed
    #[serde(default)]
    pub unread_count: Option<u64>,
}

impl<T: FeedItem> FeedPage<T> {
    /// Checks the page against the cursor it was requested with.
    ///
    /// Every item must be newer than `since`, and `lastId` must cover the
    /// newest item.
    pub fn check(&self, since: u64) -> Result<(), CompactString> {
        if let Some(stale) = self.items.iter().find(|item| item.feed_id() <= since) {
            return Err(format_compact!(
                "item {} is not newer than cursor {}",
                stale.feed_id(),
                since
            ));
        }

        let newest = self.items.iter().map(FeedItem::feed_id).max();
        if let Some(newest) = newest
            && self.last_id < newest
        {
            return Err(format_compact!(
                "lastId {} is behind newest item {}",
                self.last_id,
                newest
            ));
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: JobId,
    #[serde(default)]
    pub employer_id: Option<EmployerId>,
    pub title: CompactString,
    pub company: CompactString,
    #[serde(default)]
    pub description: CompactString,
    #[serde(default)]
    pub requirements: CompactString,
    #[serde(default)]
    pub benefits: CompactString,
    #[serde(default)]
    pub category: CompactString,
    pub location: CompactString,
    #[serde(default)]
    pub job_type: CompactString,
    #[serde(default)]
    pub specialization: Option<CompactString>,
    #[serde(default)]
    pub experience: CompactString,
    #[serde(default)]
    pub min_salary: u64,
    #[serde(default)]
    pub max_salary: u64,
    #[serde(default)]
    pub contact_email: CompactString,
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
    /// Free-form salary text, shown instead of the range when present
    #[serde(default)]
    pub salary: Option<CompactString>,
    #[serde(default)]
    pub posted_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub application_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl JobDto {
    /// Jobs without an explicit flag are listed, as the column defaults to true
    pub fn is_listed(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    /// "Title at Location", the line shown when a job is announced
    pub fn headline(&self) -> CompactString {
        format_compact!("{} at {}", self.title, self.location)
    }

    pub fn salary_label(&self) -> CompactString {
        match &self.salary {
            Some(text) if !text.is_empty() => text.clone(),
            _ => format_compact!("{} - {}", self.min_salary, self.max_salary),
        }
    }
}

impl FeedItem for JobDto {
    const STREAM: FeedStream = FeedStream::Jobs;

    fn feed_id(&self) -> u64 {
        self.id.value()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    New,
    Viewed,
    Shortlisted,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDto {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_seeker_id: JobSeekerId,
    #[serde(default)]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: Option<CompactString>,
    /// The job this application targets, attached by the server
    #[serde(default)]
    pub job: Option<JobDto>,
}

// Nullable columns with a database default: null reads as that default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl FeedItem for ApplicationDto {
    const STREAM: FeedStream = FeedStream::Applications;

    fn feed_id(&self) -> u64 {
        self.id.value()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: NotificationId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub message: CompactString,
    /// e.g. `application_status`, `inquiry_reply`, `staffing_inquiry`
    #[serde(rename = "type", default)]
    pub kind: CompactString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
    #[serde(default)]
    pub entity_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl FeedItem for NotificationDto {
    const STREAM: FeedStream = FeedStream::Notifications;

    fn feed_id(&self) -> u64 {
        self.id.value()
    }
}

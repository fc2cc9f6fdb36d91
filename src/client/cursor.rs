//! Last-seen identifier per realtime stream

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::FeedStream;

/// In-memory cursors, one per stream.
///
/// Each cursor only moves forward and is written exclusively by its own
/// stream's poll handler.
#[derive(Debug, Default)]
pub struct CursorStore {
    jobs: AtomicU64,
    applications: AtomicU64,
    notifications: AtomicU64,
}

/// Point-in-time copy of all cursors
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CursorSnapshot {
    pub jobs: u64,
    pub applications: u64,
    pub notifications: u64,
}

impl CursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, stream: FeedStream) -> &AtomicU64 {
        match stream {
            FeedStream::Jobs => &self.jobs,
            FeedStream::Applications => &self.applications,
            FeedStream::Notifications => &self.notifications,
        }
    }

    pub fn get(&self, stream: FeedStream) -> u64 {
        self.slot(stream).load(Ordering::Acquire)
    }

    /// Moves the cursor to `last_id` unless it is already further ahead.
    ///
    /// Returns the cursor value after the update. Overlapping cycles can
    /// deliver an older page after a newer one, hence the max.
    pub fn advance(&self, stream: FeedStream, last_id: u64) -> u64 {
        let previous = self.slot(stream).fetch_max(last_id, Ordering::AcqRel);
        previous.max(last_id)
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            jobs: self.get(FeedStream::Jobs),
            applications: self.get(FeedStream::Applications),
            notifications: self.get(FeedStream::Notifications),
        }
    }
}

impl CursorSnapshot {
    pub fn get(&self, stream: FeedStream) -> u64 {
        match stream {
            FeedStream::Jobs => self.jobs,
            FeedStream::Applications => self.applications,
            FeedStream::Notifications => self.notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let store = CursorStore::new();
        assert_eq!(store.snapshot(), CursorSnapshot::default());
    }

    #[test]
    fn advance_never_moves_backwards() {
        let store = CursorStore::new();

        assert_eq!(store.advance(FeedStream::Jobs, 7), 7);
        assert_eq!(store.advance(FeedStream::Jobs, 3), 7);
        assert_eq!(store.advance(FeedStream::Jobs, 7), 7);
        assert_eq!(store.advance(FeedStream::Jobs, 9), 9);
        assert_eq!(store.get(FeedStream::Jobs), 9);
    }

    #[test]
    fn streams_are_independent() {
        let store = CursorStore::new();

        store.advance(FeedStream::Applications, 4);
        store.advance(FeedStream::Notifications, 12);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.jobs, 0);
        assert_eq!(snapshot.get(FeedStream::Applications), 4);
        assert_eq!(snapshot.get(FeedStream::Notifications), 12);
    }
}

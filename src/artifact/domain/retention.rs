//! Age-based retention for stored results.

use chrono::{DateTime, TimeDelta, Utc};

/// Removes results whose modification time is older than a fixed window.
///
/// There is no count-based cap: any number of files within the window
/// survive a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    window: TimeDelta,
}

impl RetentionPolicy {
    /// Window used when no retention is configured.
    pub const DEFAULT_DAYS: u32 = 7;

    /// Creates a policy with the given window.
    #[must_use]
    pub const fn new(window: TimeDelta) -> Self {
        Self { window }
    }

    /// Creates a policy with a window of whole days.
    #[must_use]
    pub fn days(days: u32) -> Self {
        Self::new(TimeDelta::days(i64::from(days)))
    }

    /// Returns the retention window.
    #[must_use]
    pub const fn window(&self) -> TimeDelta {
        self.window
    }

    /// Returns the oldest modification time that survives a sweep at `now`.
    ///
    /// Windows reaching past the earliest representable time saturate, so
    /// nothing expires.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns whether a file modified at `modified_at` is removed by a sweep
    /// at `now`.
    #[must_use]
    pub fn is_expired(&self, modified_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        modified_at < self.cutoff(now)
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::days(Self::DEFAULT_DAYS)
    }
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Files removed because they were older than the window.
    pub removed: usize,
    /// Files kept because they were within the window.
    pub retained: usize,
    /// Expired files that could not be removed.
    pub failed: usize,
}

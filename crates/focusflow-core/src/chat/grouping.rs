//! Recency bucketing for the session sidebar.

use chrono::{DateTime, Days, TimeZone};

use focusflow_types::chat::GroupedSessions;
use focusflow_types::session::{Session, SessionSummary};

/// Oldest calendar-day distance that still lands in "Previous 30 Days".
const PREVIOUS_WINDOW_DAYS: u64 = 30;

/// Bucket sessions by the calendar date they were created on, as seen in
/// `now`'s time zone.
///
/// Input order is preserved inside each bucket. Sessions created more than
/// thirty days before today, or dated after today, are left out.
pub fn group_by_recency<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> GroupedSessions {
    let tz = now.timezone();
    let today = now.date_naive();
    let yesterday = today.checked_sub_days(Days::new(1));
    let window_start = today.checked_sub_days(Days::new(PREVIOUS_WINDOW_DAYS));

    let mut grouped = GroupedSessions::default();
    for session in sessions {
        let created = session.created_at.with_timezone(&tz).date_naive();
        let summary = SessionSummary::from(session);

        if created == today {
            grouped.today.push(summary);
        } else if Some(created) == yesterday {
            grouped.yesterday.push(summary);
        } else if created < today && window_start.is_some_and(|start| created >= start) {
            grouped.previous_30_days.push(summary);
        }
    }
    grouped
}

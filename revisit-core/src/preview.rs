use crate::{next_state, Card, PhaseSchedule, Quality};
use chrono::{DateTime, Duration, Utc};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// Human-readable "next review in" label for answering `card` with `quality`.
///
/// Runs the policy on a copy; nothing is persisted and `card` is not touched.
pub fn preview(card: &Card, quality: Quality, now: DateTime<Utc>, schedule: &PhaseSchedule) -> String {
    if !quality.is_pass() {
        return format_delta(schedule.fail_delay);
    }
    let simulated = next_state(card, quality, now, schedule);
    format_delta(simulated.due_at - now)
}

/// Labels for every answer button, in `Quality::ALL` order.
pub fn preview_all(card: &Card, now: DateTime<Utc>, schedule: &PhaseSchedule) -> [(Quality, String); 3] {
    Quality::ALL.map(|q| (q, preview(card, q, now, schedule)))
}

pub fn format_delta(delta: Duration) -> String {
    let secs = delta.num_seconds().max(0) as f64;

    let minutes = (secs / MINUTE).round() as i64;
    if minutes < 60 {
        return format!("{} min", minutes.max(1));
    }
    if secs < DAY {
        return format!("{} h", (secs / HOUR).round() as i64);
    }
    let days = secs / DAY;
    if days < 30.0 {
        format!("{} d", days.round() as i64)
    } else if days < 365.0 {
        format!("{} mo", (days / 30.0).round() as i64)
    } else {
        format!("{:.1} y", days / 365.0)
    }
}

use crate::{Card, Quality, Review, EF_MIN};
use chrono::{DateTime, Duration, Utc};

pub const EASY_BONUS: f64 = 1.3;
pub const FAIL_DELAY_SECS: i64 = 60;
/// Longest interval handed out, about a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// One fixed rung of the schedule before a card matures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Sub-day learning step. Stored on the card as `interval = 0`.
    Minutes(u32),
    Days(u32),
}

/// Interval policy shared by every review in a session.
///
/// `steps[n]` is used when a card has `n` consecutive successes; once
/// `repetitions >= steps.len()` the card is mature and its interval grows by
/// the ease factor.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseSchedule {
    pub steps: Vec<Step>,
    /// Let `Easy` jump over the current fixed step when another one follows.
    pub easy_skip: bool,
    pub easy_bonus: f64,
    pub fail_delay: Duration,
    /// Upper bound for any day interval, fixed or mature.
    pub max_interval_days: u32,
}

impl PhaseSchedule {
    /// Classic SM-2: 1 day, 6 days, then `interval * ease`.
    pub fn flat() -> Self {
        Self {
            steps: vec![Step::Days(1), Step::Days(6)],
            easy_skip: false,
            easy_bonus: EASY_BONUS,
            fail_delay: Duration::seconds(FAIL_DELAY_SECS),
            max_interval_days: MAX_INTERVAL_DAYS,
        }
    }

    /// A ten minute learning step followed by 1 and 3 day graduated steps.
    pub fn graduated() -> Self {
        Self::graduated_with(10, &[1, 3])
    }

    pub fn graduated_with(learning_minutes: u32, graduated_days: &[u32]) -> Self {
        let mut steps = vec![Step::Minutes(learning_minutes)];
        steps.extend(graduated_days.iter().map(|d| Step::Days(*d)));
        Self {
            steps,
            easy_skip: true,
            easy_bonus: EASY_BONUS,
            fail_delay: Duration::seconds(FAIL_DELAY_SECS),
            max_interval_days: MAX_INTERVAL_DAYS,
        }
    }

    /// Repetition count from which a card is considered mature.
    pub fn mature_after(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn is_learning(&self, card: &Card) -> bool {
        card.repetitions < self.mature_after()
    }

    fn with_bonus(&self, days: f64) -> u32 {
        self.round_days(days * self.easy_bonus)
    }

    fn round_days(&self, x: f64) -> u32 {
        (x.round().max(1.0) as u32).min(self.max_interval_days.max(1))
    }

    /// Picks the step to schedule and how far `repetitions` advances.
    fn plan(&self, card: &Card, quality: Quality, ease: f64) -> (Step, u32) {
        let easy = quality == Quality::Easy;
        let reps = card.repetitions as usize;

        if let Some(step) = self.steps.get(reps) {
            if easy && self.easy_skip {
                if let Some(next) = self.steps.get(reps + 1) {
                    let next = match *next {
                        Step::Days(d) => Step::Days(d.min(self.max_interval_days)),
                        other => other,
                    };
                    return (next, 2);
                }
            }
            let step = match *step {
                Step::Days(d) if easy => Step::Days(self.with_bonus(d as f64)),
                Step::Days(d) => Step::Days(d.min(self.max_interval_days)),
                other => other,
            };
            return (step, 1);
        }

        let base = card.interval.max(1) as f64 * ease;
        let days = if easy {
            self.with_bonus(base)
        } else {
            self.round_days(base)
        };
        (Step::Days(days), 1)
    }
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self::flat()
    }
}

/// `now + delta`, saturating at the latest representable instant.
fn after(now: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// SM-2 ease update, clamped at [`EF_MIN`].
pub fn next_ease(ease: f64, quality: Quality) -> f64 {
    let d = (5 - quality.as_score()) as f64;
    (ease + (0.1 - d * (0.08 + d * 0.02))).max(EF_MIN)
}

/// Computes the scheduling state that follows `quality` at `now`.
///
/// The input card is left untouched.
pub fn next_state(card: &Card, quality: Quality, now: DateTime<Utc>, schedule: &PhaseSchedule) -> Card {
    let mut next = card.clone();
    next.last_reviewed_at = Some(now);

    if !quality.is_pass() {
        next.repetitions = 0;
        next.interval = 0;
        next.due_at = after(now, schedule.fail_delay);
        return next;
    }

    let ease = next_ease(card.ease_factor, quality);
    let (step, advance) = schedule.plan(card, quality, ease);

    next.ease_factor = ease;
    next.repetitions = card.repetitions.saturating_add(advance);
    match step {
        Step::Minutes(m) => {
            next.interval = 0;
            next.due_at = after(now, Duration::minutes(m as i64));
        }
        Step::Days(d) => {
            next.interval = d;
            next.due_at = after(now, Duration::days(d as i64));
        }
    }
    next
}

pub struct ScheduleOutcome {
    pub updated_card: Card,
    pub review: Review,
}

/// [`next_state`] plus the log entry describing the review.
pub fn apply_quality(
    card: &Card,
    quality: Quality,
    now: DateTime<Utc>,
    schedule: &PhaseSchedule,
) -> ScheduleOutcome {
    let updated_card = next_state(card, quality, now, schedule);
    let review = Review::new(
        card.id,
        quality,
        now,
        updated_card.interval,
        updated_card.ease_factor,
    );
    ScheduleOutcome { updated_card, review }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_polynomial_is_exact() {
        assert!((next_ease(2.5, Quality::Easy) - 2.6).abs() < 1e-12);
        assert!((next_ease(2.5, Quality::Good) - 2.36).abs() < 1e-12);
        assert_eq!(next_ease(EF_MIN, Quality::Good), EF_MIN);
    }

    #[test]
    fn mature_interval_never_below_one_day() {
        let mut card = Card::new("a", "b");
        card.repetitions = 5;
        card.interval = 0;
        card.ease_factor = EF_MIN;
        let next = next_state(&card, Quality::Good, Utc::now(), &PhaseSchedule::flat());
        assert_eq!(next.interval, 1);
    }

    #[test]
    fn huge_intervals_are_capped() {
        let now = Utc::now();
        let schedule = PhaseSchedule::flat();
        let mut card = Card::new("a", "b");
        card.repetitions = 5;
        card.interval = 200_000_000;

        let next = next_state(&card, Quality::Good, now, &schedule);
        assert_eq!(next.interval, MAX_INTERVAL_DAYS);
        assert_eq!(next.due_at, now + Duration::days(MAX_INTERVAL_DAYS as i64));
    }

    #[test]
    fn due_date_saturates_near_the_end_of_time() {
        let now = DateTime::<Utc>::MAX_UTC - Duration::days(10);
        let mut card = Card::new("a", "b");
        card.repetitions = 5;
        card.interval = 400;
        let next = next_state(&card, Quality::Easy, now, &PhaseSchedule::flat());
        assert_eq!(next.due_at, DateTime::<Utc>::MAX_UTC);
    }
}

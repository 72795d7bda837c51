use crate::{CardId, Quality, Review};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: u32,
    pub fail: u32,
    pub good: u32,
    pub easy: u32,
}

impl Totals {
    pub fn record(&mut self, q: Quality) {
        self.total += 1;
        match q {
            Quality::Fail => self.fail += 1,
            Quality::Good => self.good += 1,
            Quality::Easy => self.easy += 1,
        }
    }

    /// Share of reviews that passed.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.good + self.easy) as f64 / self.total as f64
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StatsSummary {
    pub totals: Totals,
    pub per_day: BTreeMap<NaiveDate, Totals>,
}

pub fn summarize(reviews: &[Review]) -> StatsSummary {
    let mut summary = StatsSummary::default();
    for r in reviews {
        summary.totals.record(r.quality);
        let d = r.reviewed_at.date_naive();
        summary.per_day.entry(d).or_default().record(r.quality);
    }
    summary
}

/// Consecutive days, ending at `today`, with at least one review.
pub fn daily_streak(reviews: &[Review], today: NaiveDate) -> u32 {
    let per_day = summarize(reviews).per_day;
    let mut streak = 0u32;
    let mut day = today;
    while per_day.get(&day).is_some_and(|t| t.total > 0) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

pub fn per_card_totals(reviews: &[Review]) -> HashMap<CardId, Totals> {
    let mut map: HashMap<CardId, Totals> = HashMap::new();
    for r in reviews {
        map.entry(r.card_id).or_default().record(r.quality);
    }
    map
}

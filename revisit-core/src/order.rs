use crate::{Card, PhaseSchedule};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use unicode_casefold::{Locale, UnicodeCaseFold, Variant};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Text comparison used for the last ordering tie-break.
pub trait Collator: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Compares base letters only: full case folding, then canonical
/// decomposition with combining marks dropped. "Élan", "elan" and "ELAN"
/// compare equal.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldingCollator {
    pub turkic: bool,
}

impl FoldingCollator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&self, s: &str) -> String {
        let locale = if self.turkic {
            Locale::Turkic
        } else {
            Locale::NonTurkic
        };
        let folded: String = s.case_fold_with(Variant::Full, locale).collect();
        folded.nfd().filter(|c| !is_combining_mark(*c)).collect()
    }
}

impl Collator for FoldingCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.fold(a).cmp(&self.fold(b))
    }
}

/// Learning cards first, then earliest due, then front text.
pub fn session_order(a: &Card, b: &Card, schedule: &PhaseSchedule, collator: &dyn Collator) -> Ordering {
    let mature = |c: &Card| !schedule.is_learning(c);
    mature(a)
        .cmp(&mature(b))
        .then_with(|| a.due_at.cmp(&b.due_at))
        .then_with(|| collator.compare(&a.front, &b.front))
}

/// Presentation order for a study session. Stable: cards equal on every
/// tier keep their input order.
pub fn order_for_session(mut cards: Vec<Card>, schedule: &PhaseSchedule, collator: &dyn Collator) -> Vec<Card> {
    cards.sort_by(|a, b| session_order(a, b, schedule, collator));
    cards
}

/// Uniform random order for unordered practice.
pub fn shuffle_for_practice<R: Rng + ?Sized>(mut cards: Vec<Card>, rng: &mut R) -> Vec<Card> {
    cards.shuffle(rng);
    cards
}

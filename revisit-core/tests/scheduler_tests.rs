use chrono::{Duration, TimeZone, Utc};
use revisit_core::{
    apply_quality, next_state, preview, preview_all, Card, PhaseSchedule, Quality, Step, EF_MIN,
    MAX_INTERVAL_DAYS,
};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

#[test]
fn flat_good_progression() {
    let schedule = PhaseSchedule::flat();
    let now = t0();
    let card = Card::new_at("hola", "hello", now);

    let c1 = next_state(&card, Quality::Good, now, &schedule);
    assert_eq!(c1.repetitions, 1);
    assert_eq!(c1.interval, 1);
    assert_eq!(c1.due_at, now + Duration::days(1));
    assert_eq!(c1.last_reviewed_at, Some(now));

    let c2 = next_state(&c1, Quality::Good, now, &schedule);
    assert_eq!(c2.repetitions, 2);
    assert_eq!(c2.interval, 6);

    // Third success is mature: 6 days times the freshly updated ease.
    let c3 = next_state(&c2, Quality::Good, now, &schedule);
    assert_eq!(c3.repetitions, 3);
    assert!((c3.ease_factor - 2.08).abs() < 1e-9);
    assert_eq!(c3.interval, (6.0 * c3.ease_factor).round() as u32);
    assert_eq!(c3.interval, 12);
    assert_eq!(c3.due_at, now + Duration::days(12));
}

#[test]
fn fail_resets_from_new() {
    let now = t0();
    let card = Card::new_at("a", "b", now);
    let c = next_state(&card, Quality::Fail, now, &PhaseSchedule::flat());
    assert_eq!(c.repetitions, 0);
    assert_eq!(c.interval, 0);
    assert_eq!(c.ease_factor, card.ease_factor);
    assert_eq!(c.due_at, now + Duration::seconds(60));
}

#[test]
fn fail_resets_mature_card_and_keeps_ease() {
    let now = t0();
    let mut card = Card::new_at("a", "b", now);
    card.repetitions = 9;
    card.interval = 120;
    card.ease_factor = 2.9;

    for schedule in [PhaseSchedule::flat(), PhaseSchedule::graduated()] {
        let c = next_state(&card, Quality::Fail, now, &schedule);
        assert_eq!(c.repetitions, 0);
        assert_eq!(c.interval, 0);
        assert_eq!(c.ease_factor, 2.9);
    }
}

#[test]
fn input_card_is_not_mutated() {
    let now = t0();
    let card = Card::new_at("a", "b", now);
    let snapshot = card.clone();
    let _ = next_state(&card, Quality::Easy, now, &PhaseSchedule::graduated());
    assert_eq!(card, snapshot);
}

#[test]
fn ease_never_drops_below_minimum() {
    let now = t0();
    let schedule = PhaseSchedule::flat();
    let mut card = Card::new_at("a", "b", now);
    card.ease_factor = EF_MIN;
    for _ in 0..30 {
        card = next_state(&card, Quality::Good, now, &schedule);
        assert!(card.ease_factor >= EF_MIN);
    }
    assert_eq!(card.ease_factor, EF_MIN);
}

#[test]
fn easy_raises_ease_and_applies_bonus_when_flat() {
    let now = t0();
    let schedule = PhaseSchedule::flat();
    let card = Card::new_at("a", "b", now);

    let c1 = next_state(&card, Quality::Easy, now, &schedule);
    assert_eq!(c1.repetitions, 1);
    assert_eq!(c1.interval, 1);
    assert!((c1.ease_factor - 2.6).abs() < 1e-9);

    let c2 = next_state(&c1, Quality::Easy, now, &schedule);
    assert_eq!(c2.repetitions, 2);
    assert_eq!(c2.interval, 8); // round(6 * 1.3)

    let c3 = next_state(&c2, Quality::Easy, now, &schedule);
    assert_eq!(c3.repetitions, 3);
    assert_eq!(c3.interval, (8.0 * 2.8 * 1.3_f64).round() as u32);
}

#[test]
fn graduated_learning_step_is_sub_day() {
    let now = t0();
    let schedule = PhaseSchedule::graduated();
    let card = Card::new_at("a", "b", now);

    let c = next_state(&card, Quality::Good, now, &schedule);
    assert_eq!(c.repetitions, 1);
    assert_eq!(c.interval, 0);
    assert_eq!(c.due_at, now + Duration::minutes(10));

    let c = next_state(&c, Quality::Good, now, &schedule);
    assert_eq!(c.repetitions, 2);
    assert_eq!(c.interval, 1);

    let c = next_state(&c, Quality::Good, now, &schedule);
    assert_eq!(c.repetitions, 3);
    assert_eq!(c.interval, 3);
    assert!(!schedule.is_learning(&c));
}

#[test]
fn graduated_easy_skips_ahead() {
    let now = t0();
    let schedule = PhaseSchedule::graduated();
    let card = Card::new_at("a", "b", now);

    let c = next_state(&card, Quality::Easy, now, &schedule);
    assert_eq!(c.repetitions, 2);
    assert_eq!(c.interval, 1);
    assert_eq!(c.due_at, now + Duration::days(1));

    // Last fixed step: nothing to skip to, bonus instead.
    let c = next_state(&c, Quality::Easy, now, &schedule);
    assert_eq!(c.repetitions, 3);
    assert_eq!(c.interval, 4); // round(3 * 1.3)
}

#[test]
fn custom_schedule_steps() {
    let schedule = PhaseSchedule::graduated_with(5, &[2, 4, 7]);
    assert_eq!(
        schedule.steps,
        vec![Step::Minutes(5), Step::Days(2), Step::Days(4), Step::Days(7)]
    );
    assert_eq!(schedule.mature_after(), 4);
}

#[test]
fn outcome_carries_review_record() {
    let now = t0();
    let card = Card::new_at("a", "b", now);
    let out = apply_quality(&card, Quality::Good, now, &PhaseSchedule::flat());
    assert_eq!(out.review.card_id, card.id);
    assert_eq!(out.review.quality, Quality::Good);
    assert_eq!(out.review.interval_applied, 1);
    assert_eq!(out.review.ease_after, out.updated_card.ease_factor);
}

#[test]
fn quality_parsing_rejects_unknown_levels() {
    assert_eq!(Quality::try_from(3).unwrap(), Quality::Good);
    assert!(Quality::try_from(4).is_err());
    assert_eq!("E".parse::<Quality>().unwrap(), Quality::Easy);
    assert_eq!(" fail ".parse::<Quality>().unwrap(), Quality::Fail);
    assert!("meh".parse::<Quality>().is_err());
}

#[test]
fn preview_is_pure_and_repeatable() {
    let now = t0();
    let schedule = PhaseSchedule::flat();
    let mut card = Card::new_at("a", "b", now);
    card.repetitions = 2;
    card.interval = 6;
    let snapshot = card.clone();

    let first = preview(&card, Quality::Good, now, &schedule);
    let second = preview(&card, Quality::Good, now, &schedule);
    assert_eq!(first, second);
    assert_eq!(first, "14 d"); // round(6 * 2.36)
    assert_eq!(card, snapshot);
}

#[test]
fn preview_labels_per_button() {
    let now = t0();
    let card = Card::new_at("a", "b", now);
    let labels = preview_all(&card, now, &PhaseSchedule::graduated());
    assert_eq!(labels[0], (Quality::Fail, "1 min".to_string()));
    assert_eq!(labels[1], (Quality::Good, "10 min".to_string()));
    assert_eq!(labels[2], (Quality::Easy, "1 d".to_string()));
}

#[test]
fn quality_serializes_by_name() {
    assert_eq!(serde_json::to_string(&Quality::Easy).unwrap(), "\"easy\"");
    let q: Quality = serde_json::from_str("\"fail\"").unwrap();
    assert_eq!(q, Quality::Fail);
}

#[test]
fn repeated_easy_stays_within_cap() {
    let now = t0();
    let schedule = PhaseSchedule::flat();
    let mut card = Card::new_at("a", "b", now);
    for _ in 0..40 {
        card = next_state(&card, Quality::Easy, now, &schedule);
        assert!(card.interval <= MAX_INTERVAL_DAYS);
    }
    assert_eq!(card.interval, MAX_INTERVAL_DAYS);
    assert_eq!(card.due_at, now + Duration::days(MAX_INTERVAL_DAYS as i64));
    assert_eq!(preview(&card, Quality::Good, now, &schedule), "100.0 y");
}

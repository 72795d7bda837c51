use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

pub type CardId = Uuid;
pub type ReviewId = Uuid;

pub const EF_MIN: f64 = 1.3;
pub const EF_DEFAULT: f64 = 2.5;

/// Recall signal given after the answer is revealed.
///
/// Only three of the six SM-2 levels are used; the discriminants are the
/// numeric qualities fed into the ease polynomial.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Fail = 0,
    Good = 3,
    Easy = 5,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Fail, Quality::Good, Quality::Easy];

    pub fn as_score(&self) -> i32 {
        *self as i32
    }

    pub fn is_pass(&self) -> bool {
        self.as_score() >= Quality::Good.as_score()
    }
}

impl TryFrom<i32> for Quality {
    type Error = CoreError;

    fn try_from(score: i32) -> Result<Self, Self::Error> {
        match score {
            0 => Ok(Quality::Fail),
            3 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            other => Err(CoreError::InvalidQuality(other.to_string())),
        }
    }
}

impl FromStr for Quality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "f" | "fail" => Ok(Quality::Fail),
            "3" | "g" | "good" => Ok(Quality::Good),
            "5" | "e" | "easy" => Ok(Quality::Easy),
            _ => Err(CoreError::InvalidQuality(s.trim().to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Study,
    Practice,
}

impl Mode {
    /// Study sessions write schedule changes back by default, practice
    /// sessions leave the schedule alone.
    pub fn persists_by_default(&self) -> bool {
        matches!(self, Mode::Study)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub front: String,
    pub back: String,

    /// Days until the next review, or 0 while in a sub-day step.
    pub interval: u32,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub due_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self::new_at(front, back, Utc::now())
    }

    pub fn new_at(front: impl Into<String>, back: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            front: front.into(),
            back: back.into(),
            interval: 0,
            ease_factor: EF_DEFAULT,
            repetitions: 0,
            due_at: now,
            last_reviewed_at: None,
            created_at: now,
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    pub fn is_due(&self, before: DateTime<Utc>) -> bool {
        self.due_at <= before
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub card_id: CardId,
    pub quality: Quality,
    pub reviewed_at: DateTime<Utc>,
    pub interval_applied: u32,
    pub ease_after: f64,
}

impl Review {
    pub fn new(
        card_id: CardId,
        quality: Quality,
        reviewed_at: DateTime<Utc>,
        interval_applied: u32,
        ease_after: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            quality,
            reviewed_at,
            interval_applied,
            ease_after,
        }
    }
}

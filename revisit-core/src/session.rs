//! Traversal of one study or practice session.
//!
//! A [`Session`] owns the presentation queue and the undo slot. Every
//! operation that writes goes through the [`CardStore`] handed in by the
//! caller, and the queue only moves once that write has succeeded.

use crate::{apply_quality, Card, CardStore, CoreError, Mode, PhaseSchedule, Quality, Review, ScheduleOutcome};
use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: Mode,
    /// Write schedule changes to the store. Independent of `mode`.
    pub persist: bool,
}

impl SessionConfig {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            persist: mode.persists_by_default(),
        }
    }

    pub fn study() -> Self {
        Self::new(Mode::Study)
    }

    pub fn practice() -> Self {
        Self::new(Mode::Practice)
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}

/// State captured just before a review.
#[derive(Clone, Debug, PartialEq)]
pub struct UndoEntry {
    pub card: Card,
    pub index: usize,
    counted: bool,
    /// Log entry written for this review, removed again on undo.
    review: Option<Review>,
}

/// Holds the single most recent review. Not a stack: recording a new entry
/// drops the previous one, so only the last review can be undone.
#[derive(Clone, Debug, Default)]
pub struct UndoSlot {
    entry: Option<UndoEntry>,
}

impl UndoSlot {
    pub fn record(&mut self, entry: UndoEntry) {
        self.entry = Some(entry);
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entry.as_ref()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewOutcome {
    pub updated: Card,
    pub requeued: bool,
    pub complete: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub reviewed: usize,
    pub remaining: usize,
    pub total: usize,
}

pub struct Session {
    config: SessionConfig,
    schedule: PhaseSchedule,
    state: SessionState,
    items: Vec<Card>,
    cursor: usize,
    reviewed_count: usize,
    undo: UndoSlot,
}

impl Session {
    pub fn new(schedule: PhaseSchedule, config: SessionConfig) -> Self {
        Self {
            config,
            schedule,
            state: SessionState::Idle,
            items: Vec::new(),
            cursor: 0,
            reviewed_count: 0,
            undo: UndoSlot::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn items(&self) -> &[Card] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn reviewed_count(&self) -> usize {
        self.reviewed_count
    }

    pub fn undo_slot(&self) -> &UndoSlot {
        &self.undo
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn progress(&self) -> Progress {
        Progress {
            reviewed: self.reviewed_count,
            remaining: self.items.len().saturating_sub(self.cursor),
            total: self.items.len(),
        }
    }

    /// Begins a session over `items`, already in presentation order.
    pub fn start(&mut self, items: Vec<Card>) -> Result<(), CoreError> {
        if items.is_empty() {
            log::info!("no cards to review, session not started");
            return Err(CoreError::EmptyQueue);
        }
        log::debug!(
            "starting {:?} session with {} cards (persist={})",
            self.config.mode,
            items.len(),
            self.config.persist
        );
        self.items = items;
        self.cursor = 0;
        self.reviewed_count = 0;
        self.undo.clear();
        self.state = SessionState::Active;
        Ok(())
    }

    /// The card to present, or `None` once the session has run out.
    pub fn current(&self) -> Option<&Card> {
        match self.state {
            SessionState::Active => self.items.get(self.cursor),
            _ => None,
        }
    }

    /// Applies `quality` to the current card.
    ///
    /// A failed card is moved to the back of the queue and the cursor stays
    /// put; a passed card advances the cursor. When the session persists, the
    /// queue is left unchanged if the store rejects the write.
    pub async fn submit_review(
        &mut self,
        store: &dyn CardStore,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, CoreError> {
        match self.state {
            SessionState::Idle => return Err(CoreError::NotActive),
            SessionState::Complete => return Err(CoreError::SessionComplete),
            SessionState::Active => {}
        }
        let index = self.cursor;
        let before = self
            .items
            .get(index)
            .cloned()
            .ok_or(CoreError::SessionComplete)?;

        let ScheduleOutcome { updated_card, review } =
            apply_quality(&before, quality, now, &self.schedule);

        let mut logged = None;
        if self.config.persist {
            store
                .persist(before.id, &updated_card)
                .await
                .map_err(|e| {
                    log::warn!("persisting card {} failed: {e}", before.id);
                    CoreError::persistence(before.id, e)
                })?;
            if self.config.mode == Mode::Study {
                if let Err(e) = store.insert_review(&review).await {
                    log::warn!("logging review of card {} failed: {e}", before.id);
                    if let Err(e) = store.persist(before.id, &before).await {
                        log::warn!("rolling back card {} failed: {e}", before.id);
                    }
                    return Err(CoreError::persistence(before.id, e));
                }
                logged = Some(review);
            }
        }

        let counted = quality.is_pass();
        self.undo.record(UndoEntry {
            card: before,
            index,
            counted,
            review: logged,
        });

        if counted {
            self.items[index] = updated_card.clone();
            self.reviewed_count += 1;
            self.cursor += 1;
        } else {
            self.items.remove(index);
            self.items.push(updated_card.clone());
        }

        if self.cursor >= self.items.len() {
            log::debug!("session complete, {} reviewed", self.reviewed_count);
            self.state = SessionState::Complete;
        }

        Ok(ReviewOutcome {
            updated: updated_card,
            requeued: !counted,
            complete: self.is_complete(),
        })
    }

    /// Reverts the last review. Returns `false` when there was nothing to undo.
    pub async fn undo(&mut self, store: &dyn CardStore) -> Result<bool, CoreError> {
        let Some(entry) = self.undo.peek().cloned() else {
            return Ok(false);
        };
        let card_id = entry.card.id;

        if self.config.persist {
            if let Some(review) = &entry.review {
                store
                    .delete_review(review.id)
                    .await
                    .map_err(|e| CoreError::persistence(card_id, e))?;
            }
            if let Err(e) = store.persist(card_id, &entry.card).await {
                if let Some(review) = &entry.review {
                    if let Err(e) = store.insert_review(review).await {
                        log::warn!("restoring review {} failed: {e}", review.id);
                    }
                }
                return Err(CoreError::persistence(card_id, e));
            }
        }

        self.undo.clear();
        if let Some(pos) = self.items.iter().position(|c| c.id == card_id) {
            self.items.remove(pos);
        }
        let index = entry.index.min(self.items.len());
        self.items.insert(index, entry.card);
        self.cursor = index;
        if entry.counted {
            self.reviewed_count = self.reviewed_count.saturating_sub(1);
        }
        self.state = SessionState::Active;
        log::debug!("undid review of card {card_id}");
        Ok(true)
    }

    /// Drops the queue and undo slot. Writes already made stay committed.
    pub fn abandon(&mut self) {
        if self.state == SessionState::Active {
            log::info!(
                "session abandoned with {} of {} cards left",
                self.items.len() - self.cursor,
                self.items.len()
            );
        }
        self.items.clear();
        self.cursor = 0;
        self.reviewed_count = 0;
        self.undo.clear();
        self.state = SessionState::Idle;
    }
}

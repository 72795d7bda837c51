use crate::{Card, CardId, CoreError, Review, ReviewId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryStore {
    cards: RwLock<HashMap<CardId, Card>>,
    reviews: RwLock<Vec<Review>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let store = Self::new();
        store
            .cards
            .write()
            .extend(cards.into_iter().map(|c| (c.id, c)));
        store
    }
}

#[async_trait]
impl crate::repo::CardStore for MemoryStore {
    async fn add_card(&self, front: &str, back: &str) -> Result<Card, CoreError> {
        let card = Card::new(front, back);
        self.cards.write().insert(card.id, card.clone());
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        self.cards
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("card"))
    }

    async fn load_due(&self, before: DateTime<Utc>) -> Result<Vec<Card>, CoreError> {
        Ok(self
            .cards
            .read()
            .values()
            .filter(|c| c.is_due(before))
            .cloned()
            .collect())
    }

    async fn load_all(&self) -> Result<Vec<Card>, CoreError> {
        Ok(self.cards.read().values().cloned().collect())
    }

    async fn persist(&self, id: CardId, card: &Card) -> Result<(), CoreError> {
        let mut m = self.cards.write();
        let Some(slot) = m.get_mut(&id) else {
            return Err(CoreError::NotFound("card"));
        };
        *slot = card.clone();
        Ok(())
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        self.cards
            .write()
            .remove(&id)
            .ok_or(CoreError::NotFound("card"))?;
        self.reviews.write().retain(|r| r.card_id != id);
        Ok(())
    }

    async fn insert_review(&self, review: &Review) -> Result<(), CoreError> {
        self.reviews.write().push(review.clone());
        Ok(())
    }

    async fn delete_review(&self, id: ReviewId) -> Result<(), CoreError> {
        let mut v = self.reviews.write();
        let before = v.len();
        v.retain(|r| r.id != id);
        if v.len() == before {
            return Err(CoreError::NotFound("review"));
        }
        Ok(())
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, CoreError> {
        Ok(self.reviews.read().clone())
    }
}

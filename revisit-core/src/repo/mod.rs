use crate::{Card, CardId, CoreError, Review, ReviewId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod memory;

#[async_trait]
pub trait CardStore: Send + Sync {
    // Cards
    async fn add_card(&self, front: &str, back: &str) -> Result<Card, CoreError>;
    async fn get_card(&self, id: CardId) -> Result<Card, CoreError>;
    /// Cards with `due_at <= before`.
    async fn load_due(&self, before: DateTime<Utc>) -> Result<Vec<Card>, CoreError>;
    async fn load_all(&self) -> Result<Vec<Card>, CoreError>;
    /// Replaces the stored state of card `id`.
    async fn persist(&self, id: CardId, card: &Card) -> Result<(), CoreError>;
    async fn delete_card(&self, id: CardId) -> Result<(), CoreError>;

    // Reviews
    async fn insert_review(&self, review: &Review) -> Result<(), CoreError>;
    async fn delete_review(&self, id: ReviewId) -> Result<(), CoreError>;
    async fn list_reviews(&self) -> Result<Vec<Review>, CoreError>;
}

use crate::CardId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("storage error: {0}")]
    Storage(&'static str),
    #[error("invalid quality rating: {0}")]
    InvalidQuality(String),
    #[error("nothing to review")]
    EmptyQueue,
    #[error("session is not active")]
    NotActive,
    #[error("session is complete")]
    SessionComplete,
    #[error("failed to persist card {card_id}: {source}")]
    Persistence {
        card_id: CardId,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    pub(crate) fn persistence(card_id: CardId, source: CoreError) -> Self {
        CoreError::Persistence {
            card_id,
            source: Box::new(source),
        }
    }
}

pub mod errors;
pub mod models;
pub mod order;
pub mod preview;
pub mod repo;
pub mod scheduler;
pub mod session;
pub mod stats;

pub use errors::*;
pub use models::*;
pub use order::*;
pub use preview::*;
pub use repo::memory::MemoryStore;
pub use repo::*;
pub use scheduler::*;
pub use session::*;
pub use stats::*;

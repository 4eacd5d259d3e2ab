// Service exports
pub mod assistant;
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;

pub use assistant::{AssistantError, AssistantGateway, FALLBACK_REPLY};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{AccountStore, BookingStore, EventStore, Store, StoreError, StoreResult, VendorStore};

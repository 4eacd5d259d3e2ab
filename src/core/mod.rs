// Core rule exports
pub mod booking;
pub mod directory;
pub mod events;
pub mod filters;
pub mod recommender;

pub use booking::{BookingDecision, BookingEngine, BookingPolicy};
pub use directory::VendorDirectory;
pub use events::EventPlanner;
pub use filters::{is_visible, matches_filter, matches_location, within_budget};
pub use recommender::{RecommendationCriteria, Recommender};

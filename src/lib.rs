//! Arangetram Planner - vendor marketplace and event planning backend
//!
//! Vendors publish listings, users plan events and request bookings, and
//! vendors accept or decline them. The recommendation engine ranks listings
//! per category for an event's budget and location.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{BookingEngine, BookingPolicy, EventPlanner, RecommendationCriteria, Recommender, VendorDirectory};
pub use error::{ServiceError, ServiceResult};
pub use models::{BookingRequest, BookingStatus, Event, PriceTier, VendorListing};
pub use services::{MemoryStore, PostgresStore, Store};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let recommender = Recommender::default();
        let criteria = RecommendationCriteria::new("Fremont", None, vec!["venue".to_string()]);
        let result = recommender.recommend(&criteria, &[]);
        assert!(result["venue"].is_empty());
    }
}

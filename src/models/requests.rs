use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{BookingStatus, Category, EventStatus, PriceTier};

/// Request to create a guest account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GuestRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default = "default_guest_name")]
    pub name: String,
}

fn default_guest_name() -> String {
    "Guest".to_string()
}

/// Query string for the vendor directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorQuery {
    pub category: Option<Category>,
    pub location: Option<String>,
    pub price_range: Option<PriceTier>,
    pub search: Option<String>,
}

/// Request to create a vendor listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1))]
    pub business_name: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1))]
    pub location: String,
    pub price_range: PriceTier,
    #[serde(default)]
    pub price_estimate: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub portfolio_images: Vec<String>,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
}

/// Partial update of a vendor listing; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1))]
    pub business_name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    pub price_range: Option<PriceTier>,
    pub price_estimate: Option<String>,
    pub services: Option<Vec<String>>,
    pub portfolio_images: Option<Vec<String>>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: Option<bool>,
}

/// Request to create an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1))]
    pub event_name: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub event_time: String,
    #[validate(range(max = 100000))]
    #[serde(default = "default_guest_count")]
    pub guest_count: u32,
    #[serde(default)]
    pub budget: PriceTier,
    #[serde(default = "default_location")]
    pub location_preference: String,
    #[serde(default)]
    pub special_requirements: String,
}

fn default_guest_count() -> u32 {
    100
}

fn default_location() -> String {
    "Bay Area".to_string()
}

/// Partial update of an event; absent fields are left unchanged, never cleared
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1))]
    pub event_name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<String>,
    #[validate(range(max = 100000))]
    pub guest_count: Option<u32>,
    pub budget: Option<PriceTier>,
    pub location_preference: Option<String>,
    pub special_requirements: Option<String>,
    pub selected_vendors: Option<Vec<String>>,
    pub status: Option<EventStatus>,
}

/// Request to book a vendor for an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1))]
    pub event_id: String,
    #[validate(length(min = 1))]
    pub vendor_id: String,
    #[serde(default)]
    pub message: String,
}

/// Vendor decision on a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub response_message: Option<String>,
}

/// Criteria for vendor recommendations
///
/// `budget` is kept as raw JSON so that a malformed tier degrades to the
/// default instead of rejecting the request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub budget: Option<serde_json::Value>,
    #[serde(default = "default_location")]
    pub location: String,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub categories_needed: Vec<String>,
}

/// One turn of prior conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Free-form event details supplied alongside a chat message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    pub event_date: Option<String>,
    pub guest_count: Option<serde_json::Value>,
    pub budget: Option<serde_json::Value>,
    pub location: Option<String>,
}

/// Request to the planning assistant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(default)]
    pub event_context: Option<EventContext>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_request_defaults() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"event_name": "Priya's Arangetram", "event_date": "2026-06-15"}"#,
        )
        .unwrap();

        assert_eq!(req.guest_count, 100);
        assert_eq!(req.budget, PriceTier::Two);
        assert_eq!(req.location_preference, "Bay Area");
    }

    #[test]
    fn test_guest_count_is_bounded() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"event_name": "Arangetram", "event_date": "2026-06-15", "guest_count": 3000000000}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());

        let patch = UpdateEventRequest {
            guest_count: Some(u32::MAX),
            ..UpdateEventRequest::default()
        };
        assert!(patch.validate().is_err());

        let patch = UpdateEventRequest {
            guest_count: Some(400),
            ..UpdateEventRequest::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_recommendation_request_tolerates_bad_budget() {
        let req: RecommendationRequest = serde_json::from_str(
            r#"{"budget": {"weird": true}, "categories_needed": ["venue"]}"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.location, "Bay Area");
    }

    #[test]
    fn test_recommendation_request_requires_categories() {
        let req: RecommendationRequest = serde_json::from_str(r#"{"budget": "$$"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}

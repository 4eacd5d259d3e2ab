use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::models::domain::{Account, AccountRole, BookingRequest, Category, Event, VendorListing};

/// Booking as seen by the requester: with the vendor and event it references
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequesterBooking {
    #[serde(flatten)]
    pub booking: BookingRequest,
    pub vendor: Option<VendorListing>,
    pub event: Option<Event>,
}

/// Booking as seen by the vendor: with the requesting account and event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorBooking {
    #[serde(flatten)]
    pub booking: BookingRequest,
    pub user: Option<AccountSummary>,
    pub event: Option<Event>,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub user_type: AccountRole,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            user_type: account.role,
        }
    }
}

/// Issued credential plus the account it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: AccountSummary,
}

/// Top-ranked listings per requested category
pub type Recommendations = BTreeMap<String, Vec<VendorListing>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: Category,
    pub name: String,
    pub icon: String,
    pub description: String,
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        Self {
            id: category,
            name: category.display_name().to_string(),
            icon: category.icon().to_string(),
            description: category.description().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

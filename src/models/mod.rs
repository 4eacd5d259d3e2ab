// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Account, AccountRole, BookingRequest, BookingStatus, Category, Event, EventStatus, PriceTier,
    SelectedVendors, VendorFilter, VendorListing,
};
pub use requests::{
    ChatRequest, ChatRole, ChatTurn, CreateBookingRequest, CreateEventRequest, CreateVendorRequest,
    EventContext, GuestRequest, RecommendationRequest, UpdateBookingRequest, UpdateEventRequest,
    UpdateVendorRequest, VendorQuery,
};
pub use responses::{
    AccountSummary, CategoriesResponse, CategoryInfo, ChatResponse, ErrorResponse, HealthResponse,
    RecommendationResponse, Recommendations, RequesterBooking, TokenResponse, VendorBooking,
};

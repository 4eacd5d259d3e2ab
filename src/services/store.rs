use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;
use crate::models::{Account, BookingRequest, BookingStatus, Event, VendorFilter, VendorListing};

/// Errors raised by a backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness constraint rejected the write
    #[error("{0}")]
    Duplicate(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("{0} does not fit its column")]
    OutOfRange(&'static str),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait AccountStore {
    fn insert_account(&self, account: &Account) -> impl Future<Output = StoreResult<()>> + Send;

    fn get_account(&self, id: &str) -> impl Future<Output = StoreResult<Option<Account>>> + Send;

    fn get_accounts_by_ids(
        &self,
        ids: &[String],
    ) -> impl Future<Output = StoreResult<HashMap<String, Account>>> + Send;
}

pub trait VendorStore {
    /// Fails with [`StoreError::Duplicate`] if the owner already has a listing
    fn insert_vendor(&self, listing: &VendorListing) -> impl Future<Output = StoreResult<()>> + Send;

    fn update_vendor(&self, listing: &VendorListing) -> impl Future<Output = StoreResult<()>> + Send;

    /// Point lookup; returns inactive listings too
    fn get_vendor(&self, id: &str) -> impl Future<Output = StoreResult<Option<VendorListing>>> + Send;

    fn find_vendor_by_owner(
        &self,
        owner_account_id: &str,
    ) -> impl Future<Output = StoreResult<Option<VendorListing>>> + Send;

    /// Active listings matching the filter, in retrieval order
    fn find_vendors(
        &self,
        filter: &VendorFilter,
    ) -> impl Future<Output = StoreResult<Vec<VendorListing>>> + Send;

    fn get_vendors_by_ids(
        &self,
        ids: &[String],
    ) -> impl Future<Output = StoreResult<HashMap<String, VendorListing>>> + Send;
}

pub trait EventStore {
    fn insert_event(&self, event: &Event) -> impl Future<Output = StoreResult<()>> + Send;

    fn update_event(&self, event: &Event) -> impl Future<Output = StoreResult<()>> + Send;

    fn get_event(&self, id: &str) -> impl Future<Output = StoreResult<Option<Event>>> + Send;

    fn list_events_for_owner(
        &self,
        owner_account_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<Event>>> + Send;

    fn get_events_by_ids(
        &self,
        ids: &[String],
    ) -> impl Future<Output = StoreResult<HashMap<String, Event>>> + Send;

    /// Appends the vendor unless present. Returns whether the set changed.
    fn add_selected_vendor(
        &self,
        event_id: &str,
        vendor_id: &str,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Removes the vendor if present. Returns whether the set changed.
    fn remove_selected_vendor(
        &self,
        event_id: &str,
        vendor_id: &str,
    ) -> impl Future<Output = StoreResult<bool>> + Send;
}

pub trait BookingStore {
    fn insert_booking(&self, booking: &BookingRequest) -> impl Future<Output = StoreResult<()>> + Send;

    fn get_booking(&self, id: &str) -> impl Future<Output = StoreResult<Option<BookingRequest>>> + Send;

    fn list_bookings_for_requester(
        &self,
        account_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<BookingRequest>>> + Send;

    fn list_bookings_for_vendor(
        &self,
        vendor_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<BookingRequest>>> + Send;

    /// Moves a booking out of `pending`
    ///
    /// The write only applies while the stored status is still `pending`;
    /// `None` means the booking is absent or already terminal.
    fn transition_booking(
        &self,
        id: &str,
        status: BookingStatus,
        response_message: Option<&str>,
        at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<BookingRequest>>> + Send;
}

/// Everything the service needs from its backing store
pub trait Store: AccountStore + VendorStore + EventStore + BookingStore + Clone + Send + Sync + 'static {
    fn health_check(&self) -> impl Future<Output = StoreResult<bool>> + Send;
}

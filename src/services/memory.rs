use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::core::filters::matches_filter;
use crate::models::{Account, BookingRequest, BookingStatus, Event, VendorFilter, VendorListing};
use crate::services::store::{
    AccountStore, BookingStore, EventStore, Store, StoreError, StoreResult, VendorStore,
};

#[derive(Debug, Default)]
struct Collections {
    accounts: HashMap<String, Account>,
    // Vecs keep insertion order, which is the retrieval order
    vendors: Vec<VendorListing>,
    events: Vec<Event>,
    bookings: Vec<BookingRequest>,
}

/// In-process store
///
/// Mirrors the PostgreSQL store's semantics, including the uniqueness of
/// `owner_account_id` on listings and the conditional booking transition.
/// Used by the test suites and for running the service without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Collections>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        let mut data = self.lock()?;
        if data.accounts.contains_key(&account.id) {
            return Err(StoreError::Duplicate(format!("Account {} already exists", account.id)));
        }
        data.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.lock()?.accounts.get(id).cloned())
    }

    async fn get_accounts_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, Account>> {
        let data = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| data.accounts.get(id).map(|a| (id.clone(), a.clone())))
            .collect())
    }
}

impl VendorStore for MemoryStore {
    async fn insert_vendor(&self, listing: &VendorListing) -> StoreResult<()> {
        let mut data = self.lock()?;
        if data
            .vendors
            .iter()
            .any(|v| v.owner_account_id == listing.owner_account_id)
        {
            return Err(StoreError::Duplicate("Vendor profile already exists".to_string()));
        }
        data.vendors.push(listing.clone());
        Ok(())
    }

    async fn update_vendor(&self, listing: &VendorListing) -> StoreResult<()> {
        let mut data = self.lock()?;
        if let Some(slot) = data.vendors.iter_mut().find(|v| v.id == listing.id) {
            *slot = listing.clone();
        }
        Ok(())
    }

    async fn get_vendor(&self, id: &str) -> StoreResult<Option<VendorListing>> {
        Ok(self.lock()?.vendors.iter().find(|v| v.id == id).cloned())
    }

    async fn find_vendor_by_owner(&self, owner_account_id: &str) -> StoreResult<Option<VendorListing>> {
        Ok(self
            .lock()?
            .vendors
            .iter()
            .find(|v| v.owner_account_id == owner_account_id)
            .cloned())
    }

    async fn find_vendors(&self, filter: &VendorFilter) -> StoreResult<Vec<VendorListing>> {
        Ok(self
            .lock()?
            .vendors
            .iter()
            .filter(|v| matches_filter(v, filter))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn get_vendors_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, VendorListing>> {
        let data = self.lock()?;
        Ok(data
            .vendors
            .iter()
            .filter(|v| ids.contains(&v.id))
            .map(|v| (v.id.clone(), v.clone()))
            .collect())
    }
}

impl EventStore for MemoryStore {
    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        self.lock()?.events.push(event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> StoreResult<()> {
        let mut data = self.lock()?;
        if let Some(slot) = data.events.iter_mut().find(|e| e.id == event.id) {
            *slot = event.clone();
        }
        Ok(())
    }

    async fn get_event(&self, id: &str) -> StoreResult<Option<Event>> {
        Ok(self.lock()?.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events_for_owner(&self, owner_account_id: &str) -> StoreResult<Vec<Event>> {
        Ok(self
            .lock()?
            .events
            .iter()
            .filter(|e| e.owner_account_id == owner_account_id)
            .cloned()
            .collect())
    }

    async fn get_events_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, Event>> {
        let data = self.lock()?;
        Ok(data
            .events
            .iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| (e.id.clone(), e.clone()))
            .collect())
    }

    async fn add_selected_vendor(&self, event_id: &str, vendor_id: &str) -> StoreResult<bool> {
        let mut data = self.lock()?;
        Ok(data
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .map(|e| e.selected_vendor_ids.insert(vendor_id))
            .unwrap_or(false))
    }

    async fn remove_selected_vendor(&self, event_id: &str, vendor_id: &str) -> StoreResult<bool> {
        let mut data = self.lock()?;
        Ok(data
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .map(|e| e.selected_vendor_ids.remove(vendor_id))
            .unwrap_or(false))
    }
}

impl BookingStore for MemoryStore {
    async fn insert_booking(&self, booking: &BookingRequest) -> StoreResult<()> {
        self.lock()?.bookings.push(booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: &str) -> StoreResult<Option<BookingRequest>> {
        Ok(self.lock()?.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings_for_requester(&self, account_id: &str) -> StoreResult<Vec<BookingRequest>> {
        Ok(self
            .lock()?
            .bookings
            .iter()
            .filter(|b| b.requester_account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_bookings_for_vendor(&self, vendor_id: &str) -> StoreResult<Vec<BookingRequest>> {
        Ok(self
            .lock()?
            .bookings
            .iter()
            .filter(|b| b.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn transition_booking(
        &self,
        id: &str,
        status: BookingStatus,
        response_message: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<BookingRequest>> {
        let mut data = self.lock()?;
        let Some(booking) = data
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == BookingStatus::Pending)
        else {
            return Ok(None);
        };

        booking.status = status;
        booking.updated_at = at;
        if let Some(message) = response_message {
            booking.response_message = Some(message.to_string());
        }
        Ok(Some(booking.clone()))
    }
}

impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(self.lock().is_ok())
    }
}

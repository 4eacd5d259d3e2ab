use chrono::Utc;
use std::collections::HashSet;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    AccountSummary, BookingRequest, BookingStatus, RequesterBooking, VendorBooking,
};
use crate::services::Store;

/// Who may open a booking against an event
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingPolicy {
    /// When set, only the event's owner may request bookings for it.
    /// Off by default: any authenticated account may book against any event id it knows.
    pub require_event_owner: bool,
}

/// A vendor's answer to a pending booking
#[derive(Debug, Clone)]
pub struct BookingDecision {
    pub status: BookingStatus,
    pub response_message: Option<String>,
}

/// Owns the booking lifecycle
///
/// Bookings start `pending` and move exactly once to `accepted` or
/// `declined`, and only at the hand of the account owning the booked
/// vendor listing. Referenced events and listings are checked on creation
/// and never re-validated.
#[derive(Debug, Clone)]
pub struct BookingEngine<S> {
    store: S,
    policy: BookingPolicy,
}

impl<S: Store> BookingEngine<S> {
    pub fn new(store: S, policy: BookingPolicy) -> Self {
        Self { store, policy }
    }

    /// Open a `pending` booking, copying the event's current date into it
    pub async fn create(
        &self,
        requester_account_id: &str,
        event_id: &str,
        vendor_id: &str,
        message: String,
    ) -> ServiceResult<BookingRequest> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event"))?;

        if self.policy.require_event_owner && event.owner_account_id != requester_account_id {
            // Same answer as a missing event so ids cannot be probed
            return Err(ServiceError::not_found("Event"));
        }

        let vendor = self
            .store
            .get_vendor(vendor_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor"))?;

        let booking = BookingRequest::new(&event, &vendor.id, requester_account_id, message);
        self.store.insert_booking(&booking).await?;

        tracing::info!(
            "Booking {} created by {} for event {} with vendor {}",
            booking.id,
            requester_account_id,
            booking.event_id,
            booking.vendor_id
        );

        Ok(booking)
    }

    /// Bookings opened by the account, each with its vendor and event attached
    pub async fn list_for_requester(&self, account_id: &str) -> ServiceResult<Vec<RequesterBooking>> {
        let bookings = self.store.list_bookings_for_requester(account_id).await?;

        let vendor_ids = unique_ids(bookings.iter().map(|b| &b.vendor_id));
        let event_ids = unique_ids(bookings.iter().map(|b| &b.event_id));
        let vendors = self.store.get_vendors_by_ids(&vendor_ids).await?;
        let events = self.store.get_events_by_ids(&event_ids).await?;

        Ok(bookings
            .into_iter()
            .map(|booking| RequesterBooking {
                vendor: vendors.get(&booking.vendor_id).cloned(),
                event: events.get(&booking.event_id).cloned(),
                booking,
            })
            .collect())
    }

    /// Bookings against the account's vendor listing, each with the requester and event attached
    pub async fn list_for_vendor_owner(&self, account_id: &str) -> ServiceResult<Vec<VendorBooking>> {
        let listing = self
            .store
            .find_vendor_by_owner(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor profile"))?;

        let bookings = self.store.list_bookings_for_vendor(&listing.id).await?;

        let account_ids = unique_ids(bookings.iter().map(|b| &b.requester_account_id));
        let event_ids = unique_ids(bookings.iter().map(|b| &b.event_id));
        let accounts = self.store.get_accounts_by_ids(&account_ids).await?;
        let events = self.store.get_events_by_ids(&event_ids).await?;

        Ok(bookings
            .into_iter()
            .map(|booking| VendorBooking {
                user: accounts
                    .get(&booking.requester_account_id)
                    .cloned()
                    .map(AccountSummary::from),
                event: events.get(&booking.event_id).cloned(),
                booking,
            })
            .collect())
    }

    /// Move a pending booking to a terminal state
    ///
    /// # Errors
    /// * `NotFound` if the booking does not exist
    /// * `Forbidden` if the actor does not own the booked listing (or owns none)
    /// * `InvalidState` if the booking is no longer pending or the target is not terminal
    pub async fn transition(
        &self,
        booking_id: &str,
        actor_account_id: &str,
        decision: BookingDecision,
    ) -> ServiceResult<BookingRequest> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;

        let owns_listing = self
            .store
            .find_vendor_by_owner(actor_account_id)
            .await?
            .is_some_and(|listing| listing.id == booking.vendor_id);

        if !owns_listing {
            tracing::warn!(
                "Account {} attempted to transition booking {} it does not own",
                actor_account_id,
                booking_id
            );
            return Err(ServiceError::forbidden("only the booked vendor may respond"));
        }

        if !booking.status.can_transition_to(decision.status) {
            return Err(ServiceError::InvalidState {
                from: booking.status,
                to: decision.status,
            });
        }

        let updated = self
            .store
            .transition_booking(
                booking_id,
                decision.status,
                decision.response_message.as_deref(),
                Utc::now(),
            )
            .await?;

        match updated {
            Some(updated) => {
                tracing::info!("Booking {} moved to {} by {}", booking_id, updated.status, actor_account_id);
                Ok(updated)
            }
            None => {
                // Another decision landed between the read and the conditional write
                let current = self
                    .store
                    .get_booking(booking_id)
                    .await?
                    .map(|b| b.status)
                    .unwrap_or(booking.status);
                Err(ServiceError::InvalidState {
                    from: current,
                    to: decision.status,
                })
            }
        }
    }
}

/// Distinct ids in first-seen order, for batch lookups
fn unique_ids<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::{Account, AccountRole, Category, Event, EventStatus, PriceTier, SelectedVendors, VendorListing};
    use crate::services::{AccountStore, EventStore, MemoryStore, VendorStore};

    fn listing(id: &str, owner: &str) -> VendorListing {
        VendorListing {
            id: id.to_string(),
            owner_account_id: owner.to_string(),
            business_name: "Kalai Cinema".to_string(),
            category: Category::Videographer,
            description: String::new(),
            location: "Milpitas, CA".to_string(),
            price_range: "$$$".to_string(),
            price_estimate: String::new(),
            services: vec![],
            portfolio_images: vec![],
            contact_phone: String::new(),
            contact_email: String::new(),
            rating: 4.8,
            review_count: 38,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn event(id: &str, owner: &str) -> Event {
        Event {
            id: id.to_string(),
            owner_account_id: owner.to_string(),
            event_name: "Arangetram".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
            event_time: String::new(),
            guest_count: 150,
            budget_tier: PriceTier::Three,
            location_preference: "Bay Area".to_string(),
            special_requirements: String::new(),
            selected_vendor_ids: SelectedVendors::new(),
            status: EventStatus::Planning,
            created_at: Utc::now(),
        }
    }

    async fn seeded() -> (BookingEngine<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        store.insert_vendor(&listing("vendor-1", "vendor-owner")).await.unwrap();
        store.insert_vendor(&listing("vendor-2", "other-vendor-owner")).await.unwrap();
        store.insert_event(&event("event-1", "planner")).await.unwrap();
        store
            .insert_account(&Account {
                id: "planner".to_string(),
                email: Some("planner@example.com".to_string()),
                name: "Planner".to_string(),
                role: AccountRole::User,
                password_hash: String::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        (BookingEngine::new(store.clone(), BookingPolicy::default()), store)
    }

    fn decide(status: BookingStatus) -> BookingDecision {
        BookingDecision {
            status,
            response_message: None,
        }
    }

    #[tokio::test]
    async fn test_create_copies_event_date_and_starts_pending() {
        let (engine, store) = seeded().await;

        let booking = engine
            .create("planner", "event-1", "vendor-1", "Are you free?".to_string())
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.event_date, NaiveDate::from_ymd_opt(2026, 6, 15).unwrap());

        // Moving the event later does not touch the booking
        let mut moved = store.get_event("event-1").await.unwrap().unwrap();
        moved.event_date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        store.update_event(&moved).await.unwrap();

        let listed = engine.list_for_requester("planner").await.unwrap();
        assert_eq!(listed[0].booking.event_date, NaiveDate::from_ymd_opt(2026, 6, 15).unwrap());
    }

    #[tokio::test]
    async fn test_create_requires_existing_references() {
        let (engine, _) = seeded().await;

        let missing_event = engine.create("planner", "nope", "vendor-1", String::new()).await;
        assert!(matches!(missing_event, Err(ServiceError::NotFound(_))));

        let missing_vendor = engine.create("planner", "event-1", "nope", String::new()).await;
        assert!(matches!(missing_vendor, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_any_account_may_book_by_default() {
        let (engine, _) = seeded().await;

        let booking = engine.create("stranger", "event-1", "vendor-1", String::new()).await;
        assert!(booking.is_ok());
    }

    #[tokio::test]
    async fn test_owner_only_policy() {
        let (_, store) = seeded().await;
        let engine = BookingEngine::new(store, BookingPolicy { require_event_owner: true });

        let stranger = engine.create("stranger", "event-1", "vendor-1", String::new()).await;
        assert!(matches!(stranger, Err(ServiceError::NotFound(_))));

        let owner = engine.create("planner", "event-1", "vendor-1", String::new()).await;
        assert!(owner.is_ok());
    }

    #[tokio::test]
    async fn test_transition_by_listing_owner() {
        let (engine, _) = seeded().await;
        let booking = engine.create("planner", "event-1", "vendor-1", String::new()).await.unwrap();

        let updated = engine
            .transition(
                &booking.id,
                "vendor-owner",
                BookingDecision {
                    status: BookingStatus::Accepted,
                    response_message: Some("See you there".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Accepted);
        assert_eq!(updated.response_message.as_deref(), Some("See you there"));
        assert!(updated.updated_at >= booking.updated_at);
    }

    #[tokio::test]
    async fn test_transition_forbidden_for_non_owners() {
        let (engine, _) = seeded().await;
        let booking = engine.create("planner", "event-1", "vendor-1", String::new()).await.unwrap();

        // event owner, a different vendor, an account with no listing
        for actor in ["planner", "other-vendor-owner", "nobody"] {
            let result = engine.transition(&booking.id, actor, decide(BookingStatus::Accepted)).await;
            assert!(matches!(result, Err(ServiceError::Forbidden(_))), "actor {}", actor);
        }
    }

    #[tokio::test]
    async fn test_transition_missing_booking() {
        let (engine, _) = seeded().await;

        let result = engine.transition("missing", "vendor-owner", decide(BookingStatus::Declined)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_terminal_state_rejects_second_transition() {
        let (engine, _) = seeded().await;
        let booking = engine.create("planner", "event-1", "vendor-1", String::new()).await.unwrap();

        engine
            .transition(&booking.id, "vendor-owner", decide(BookingStatus::Accepted))
            .await
            .unwrap();

        let again = engine
            .transition(&booking.id, "vendor-owner", decide(BookingStatus::Accepted))
            .await;
        assert!(matches!(
            again,
            Err(ServiceError::InvalidState {
                from: BookingStatus::Accepted,
                to: BookingStatus::Accepted
            })
        ));

        let flip = engine
            .transition(&booking.id, "vendor-owner", decide(BookingStatus::Declined))
            .await;
        assert!(matches!(flip, Err(ServiceError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_transition_to_pending_is_invalid() {
        let (engine, _) = seeded().await;
        let booking = engine.create("planner", "event-1", "vendor-1", String::new()).await.unwrap();

        let result = engine
            .transition(&booking.id, "vendor-owner", decide(BookingStatus::Pending))
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_vendor_view_requires_listing() {
        let (engine, _) = seeded().await;

        let result = engine.list_for_vendor_owner("planner").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_vendor_view_enriches_with_requester_and_event() {
        let (engine, _) = seeded().await;
        engine.create("planner", "event-1", "vendor-1", String::new()).await.unwrap();
        engine.create("ghost", "event-1", "vendor-1", String::new()).await.unwrap();
        engine.create("planner", "event-1", "vendor-2", String::new()).await.unwrap();

        let listed = engine.list_for_vendor_owner("vendor-owner").await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].user.as_ref().map(|u| u.name.as_str()), Some("Planner"));
        assert!(listed[0].event.is_some());
        // Dangling requester reference is attached as null, not an error
        assert!(listed[1].user.is_none());
    }

    #[tokio::test]
    async fn test_requester_view_tolerates_dangling_references() {
        let (engine, store) = seeded().await;
        let mut booking = engine.create("planner", "event-1", "vendor-1", String::new()).await.unwrap();

        booking.id = "dangling".to_string();
        booking.vendor_id = "deleted-vendor".to_string();
        crate::services::BookingStore::insert_booking(&store, &booking).await.unwrap();

        let listed = engine.list_for_requester("planner").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].vendor.is_some());
        assert!(listed[1].vendor.is_none());
        assert!(listed[1].event.is_some());
    }

    #[test]
    fn test_unique_ids_keeps_first_seen_order() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(unique_ids(ids.iter()), vec!["b".to_string(), "a".to_string()]);
    }
}

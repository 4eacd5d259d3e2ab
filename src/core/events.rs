use chrono::Utc;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{CreateEventRequest, Event, EventStatus, SelectedVendors, UpdateEventRequest};
use crate::services::Store;

/// Per-account events
///
/// Every read and write is gated on ownership. Someone else's event is
/// reported as `NotFound`, never `Forbidden`, so ids cannot be probed.
#[derive(Debug, Clone)]
pub struct EventPlanner<S> {
    store: S,
}

impl<S: Store> EventPlanner<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner_account_id: &str, req: CreateEventRequest) -> ServiceResult<Event> {
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            owner_account_id: owner_account_id.to_string(),
            event_name: req.event_name,
            event_date: req.event_date,
            event_time: req.event_time,
            guest_count: req.guest_count,
            budget_tier: req.budget,
            location_preference: req.location_preference,
            special_requirements: req.special_requirements,
            selected_vendor_ids: SelectedVendors::new(),
            status: EventStatus::Planning,
            created_at: Utc::now(),
        };

        self.store.insert_event(&event).await?;
        tracing::info!("Event {} created for {}", event.id, owner_account_id);

        Ok(event)
    }

    pub async fn list_for_owner(&self, owner_account_id: &str) -> ServiceResult<Vec<Event>> {
        Ok(self.store.list_events_for_owner(owner_account_id).await?)
    }

    pub async fn get(&self, id: &str, owner_account_id: &str) -> ServiceResult<Event> {
        self.store
            .get_event(id)
            .await?
            .filter(|event| event.owner_account_id == owner_account_id)
            .ok_or_else(|| ServiceError::not_found("Event"))
    }

    /// Apply a partial update. Absent fields keep their current value.
    pub async fn update(
        &self,
        id: &str,
        owner_account_id: &str,
        patch: UpdateEventRequest,
    ) -> ServiceResult<Event> {
        let mut event = self.get(id, owner_account_id).await?;

        if let Some(v) = patch.event_name {
            event.event_name = v;
        }
        if let Some(v) = patch.event_date {
            event.event_date = v;
        }
        if let Some(v) = patch.event_time {
            event.event_time = v;
        }
        if let Some(v) = patch.guest_count {
            event.guest_count = v;
        }
        if let Some(v) = patch.budget {
            event.budget_tier = v;
        }
        if let Some(v) = patch.location_preference {
            event.location_preference = v;
        }
        if let Some(v) = patch.special_requirements {
            event.special_requirements = v;
        }
        if let Some(ids) = patch.selected_vendors {
            event.selected_vendor_ids = ids.into_iter().collect();
        }
        if let Some(v) = patch.status {
            event.status = v;
        }

        self.store.update_event(&event).await?;
        tracing::debug!("Event {} updated", event.id);

        Ok(event)
    }

    /// Attach a vendor to the event. Attaching one already present is a no-op.
    pub async fn add_vendor(&self, id: &str, owner_account_id: &str, vendor_id: &str) -> ServiceResult<Event> {
        self.get(id, owner_account_id).await?;

        if self.store.get_vendor(vendor_id).await?.is_none() {
            return Err(ServiceError::not_found("Vendor"));
        }

        if self.store.add_selected_vendor(id, vendor_id).await? {
            tracing::debug!("Vendor {} added to event {}", vendor_id, id);
        }

        self.get(id, owner_account_id).await
    }

    /// Detach a vendor from the event. Detaching one that is absent is a no-op.
    pub async fn remove_vendor(&self, id: &str, owner_account_id: &str, vendor_id: &str) -> ServiceResult<Event> {
        self.get(id, owner_account_id).await?;

        if self.store.remove_selected_vendor(id, vendor_id).await? {
            tracing::debug!("Vendor {} removed from event {}", vendor_id, id);
        }

        self.get(id, owner_account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::{Category, PriceTier, VendorListing};
    use crate::services::{MemoryStore, VendorStore};

    fn create_request() -> CreateEventRequest {
        serde_json::from_value(serde_json::json!({
            "event_name": "Ananya's Arangetram",
            "event_date": "2026-06-15",
            "guest_count": 200,
            "budget": "$$$"
        }))
        .unwrap()
    }

    async fn planner_with_vendor() -> EventPlanner<MemoryStore> {
        let store = MemoryStore::new();
        store
            .insert_vendor(&VendorListing {
                id: "vendor-1".to_string(),
                owner_account_id: "vendor-owner".to_string(),
                business_name: "Shruti Decor".to_string(),
                category: Category::Decorations,
                description: String::new(),
                location: "San Jose, CA".to_string(),
                price_range: "$$".to_string(),
                price_estimate: String::new(),
                services: vec![],
                portfolio_images: vec![],
                contact_phone: String::new(),
                contact_email: String::new(),
                rating: 4.6,
                review_count: 12,
                active: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        EventPlanner::new(store)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let planner = planner_with_vendor().await;
        let event = planner.create("owner", create_request()).await.unwrap();

        assert_eq!(event.status, EventStatus::Planning);
        assert_eq!(event.budget_tier, PriceTier::Three);
        assert!(event.selected_vendor_ids.is_empty());

        let listed = planner.list_for_owner("owner").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(planner.list_for_owner("someone-else").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_accounts_see_not_found() {
        let planner = planner_with_vendor().await;
        let event = planner.create("owner", create_request()).await.unwrap();

        let read = planner.get(&event.id, "intruder").await;
        assert!(matches!(read, Err(ServiceError::NotFound(_))));

        let write = planner.update(&event.id, "intruder", UpdateEventRequest::default()).await;
        assert!(matches!(write, Err(ServiceError::NotFound(_))));

        let attach = planner.add_vendor(&event.id, "intruder", "vendor-1").await;
        assert!(matches!(attach, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_leaves_unset_fields() {
        let planner = planner_with_vendor().await;
        let event = planner.create("owner", create_request()).await.unwrap();

        let patch = UpdateEventRequest {
            guest_count: Some(250),
            event_date: NaiveDate::from_ymd_opt(2026, 7, 4),
            ..Default::default()
        };
        let updated = planner.update(&event.id, "owner", patch).await.unwrap();

        assert_eq!(updated.guest_count, 250);
        assert_eq!(updated.event_date, NaiveDate::from_ymd_opt(2026, 7, 4).unwrap());
        assert_eq!(updated.event_name, "Ananya's Arangetram");
        assert_eq!(updated.budget_tier, PriceTier::Three);
    }

    #[tokio::test]
    async fn test_update_dedupes_selected_vendors() {
        let planner = planner_with_vendor().await;
        let event = planner.create("owner", create_request()).await.unwrap();

        let patch = UpdateEventRequest {
            selected_vendors: Some(vec!["a".into(), "b".into(), "a".into()]),
            ..Default::default()
        };
        let updated = planner.update(&event.id, "owner", patch).await.unwrap();

        assert_eq!(updated.selected_vendor_ids.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_add_and_remove_are_idempotent() {
        let planner = planner_with_vendor().await;
        let event = planner.create("owner", create_request()).await.unwrap();

        let once = planner.add_vendor(&event.id, "owner", "vendor-1").await.unwrap();
        let twice = planner.add_vendor(&event.id, "owner", "vendor-1").await.unwrap();
        assert_eq!(once.selected_vendor_ids, twice.selected_vendor_ids);
        assert_eq!(twice.selected_vendor_ids.len(), 1);

        let removed = planner.remove_vendor(&event.id, "owner", "vendor-1").await.unwrap();
        assert!(removed.selected_vendor_ids.is_empty());
        let again = planner.remove_vendor(&event.id, "owner", "vendor-1").await.unwrap();
        assert!(again.selected_vendor_ids.is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_vendor() {
        let planner = planner_with_vendor().await;
        let event = planner.create("owner", create_request()).await.unwrap();

        let result = planner.add_vendor(&event.id, "owner", "missing").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}

use chrono::Utc;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    AccountRole, CreateVendorRequest, UpdateVendorRequest, VendorFilter, VendorListing,
};
use crate::services::Store;

/// Vendor listings: lookup, creation and owner-gated edits
#[derive(Debug, Clone)]
pub struct VendorDirectory<S> {
    store: S,
}

impl<S: Store> VendorDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Active listings matching the filter, in retrieval order
    pub async fn find(&self, filter: &VendorFilter) -> ServiceResult<Vec<VendorListing>> {
        let listings = self.store.find_vendors(filter).await?;
        tracing::debug!("Directory lookup returned {} listings", listings.len());
        Ok(listings)
    }

    /// Single listing. An inactive listing is only visible to its owner.
    pub async fn get(&self, id: &str, viewer_account_id: Option<&str>) -> ServiceResult<VendorListing> {
        let listing = self
            .store
            .get_vendor(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor"))?;

        if !listing.active && viewer_account_id != Some(listing.owner_account_id.as_str()) {
            return Err(ServiceError::not_found("Vendor"));
        }

        Ok(listing)
    }

    /// The listing owned by the account, active or not
    pub async fn get_for_owner(&self, account_id: &str) -> ServiceResult<VendorListing> {
        self.store
            .find_vendor_by_owner(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor profile"))
    }

    pub async fn create(
        &self,
        owner_account_id: &str,
        role: AccountRole,
        req: CreateVendorRequest,
    ) -> ServiceResult<VendorListing> {
        if role != AccountRole::Vendor {
            return Err(ServiceError::forbidden("only vendor accounts can create listings"));
        }

        // Fast path; the storage uniqueness constraint settles concurrent creates
        if self.store.find_vendor_by_owner(owner_account_id).await?.is_some() {
            return Err(ServiceError::Conflict("Vendor profile already exists".to_string()));
        }

        let listing = VendorListing {
            id: uuid::Uuid::new_v4().to_string(),
            owner_account_id: owner_account_id.to_string(),
            business_name: req.business_name,
            category: req.category,
            description: req.description,
            location: req.location,
            price_range: req.price_range.symbol().to_string(),
            price_estimate: req.price_estimate,
            services: req.services,
            portfolio_images: req.portfolio_images,
            contact_phone: req.contact_phone,
            contact_email: req.contact_email,
            rating: 0.0,
            review_count: 0,
            active: true,
            created_at: Utc::now(),
        };

        self.store.insert_vendor(&listing).await?;
        tracing::info!("Vendor listing {} created for {}", listing.id, owner_account_id);

        Ok(listing)
    }

    /// Apply a partial update. Absent fields keep their current value.
    pub async fn update(
        &self,
        id: &str,
        actor_account_id: &str,
        patch: UpdateVendorRequest,
    ) -> ServiceResult<VendorListing> {
        let mut listing = self
            .store
            .get_vendor(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor"))?;

        if listing.owner_account_id != actor_account_id {
            return Err(ServiceError::forbidden("only the listing owner may edit it"));
        }

        apply_patch(&mut listing, patch);
        self.store.update_vendor(&listing).await?;
        tracing::info!("Vendor listing {} updated", listing.id);

        Ok(listing)
    }
}

fn apply_patch(listing: &mut VendorListing, patch: UpdateVendorRequest) {
    if let Some(v) = patch.business_name {
        listing.business_name = v;
    }
    if let Some(v) = patch.description {
        listing.description = v;
    }
    if let Some(v) = patch.location {
        listing.location = v;
    }
    if let Some(v) = patch.price_range {
        listing.price_range = v.symbol().to_string();
    }
    if let Some(v) = patch.price_estimate {
        listing.price_estimate = v;
    }
    if let Some(v) = patch.services {
        listing.services = v;
    }
    if let Some(v) = patch.portfolio_images {
        listing.portfolio_images = v;
    }
    if let Some(v) = patch.contact_phone {
        listing.contact_phone = v;
    }
    if let Some(v) = patch.contact_email {
        listing.contact_email = v;
    }
    if let Some(v) = patch.is_active {
        listing.active = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, PriceTier};
    use crate::services::MemoryStore;

    fn create_request(name: &str) -> CreateVendorRequest {
        CreateVendorRequest {
            business_name: name.to_string(),
            category: Category::Catering,
            description: "South Indian vegetarian catering".to_string(),
            location: "Fremont, CA".to_string(),
            price_range: PriceTier::Two,
            price_estimate: "$25 - $40 per person".to_string(),
            services: vec!["Full service".to_string()],
            portfolio_images: vec![],
            contact_phone: String::new(),
            contact_email: String::new(),
        }
    }

    #[tokio::test]
    async fn test_second_listing_for_owner_conflicts() {
        let directory = VendorDirectory::new(MemoryStore::new());

        directory
            .create("owner", AccountRole::Vendor, create_request("Saravana Bhavan"))
            .await
            .unwrap();
        let second = directory
            .create("owner", AccountRole::Vendor, create_request("Annapoorna"))
            .await;

        assert!(matches!(second, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_non_vendor_cannot_create() {
        let directory = VendorDirectory::new(MemoryStore::new());

        for role in [AccountRole::User, AccountRole::Guest] {
            let result = directory.create("someone", role, create_request("Tiffin House")).await;
            assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        }
    }

    #[tokio::test]
    async fn test_new_listing_starts_active_and_unrated() {
        let directory = VendorDirectory::new(MemoryStore::new());

        let listing = directory
            .create("owner", AccountRole::Vendor, create_request("Saravana Bhavan"))
            .await
            .unwrap();

        assert!(listing.active);
        assert_eq!(listing.rating, 0.0);
        assert_eq!(listing.review_count, 0);
        assert_eq!(listing.price_range, "$$");
    }

    #[tokio::test]
    async fn test_update_is_owner_only_and_partial() {
        let directory = VendorDirectory::new(MemoryStore::new());
        let listing = directory
            .create("owner", AccountRole::Vendor, create_request("Saravana Bhavan"))
            .await
            .unwrap();

        let patch = UpdateVendorRequest {
            price_range: Some(PriceTier::Three),
            ..Default::default()
        };

        let stranger = directory.update(&listing.id, "stranger", patch.clone()).await;
        assert!(matches!(stranger, Err(ServiceError::Forbidden(_))));

        let updated = directory.update(&listing.id, "owner", patch).await.unwrap();
        assert_eq!(updated.price_range, "$$$");
        assert_eq!(updated.business_name, "Saravana Bhavan");
        assert_eq!(updated.location, "Fremont, CA");

        let missing = directory.update("missing", "owner", UpdateVendorRequest::default()).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_inactive_listing_hidden_from_others() {
        let directory = VendorDirectory::new(MemoryStore::new());
        let listing = directory
            .create("owner", AccountRole::Vendor, create_request("Saravana Bhavan"))
            .await
            .unwrap();

        let deactivate = UpdateVendorRequest {
            is_active: Some(false),
            ..Default::default()
        };
        directory.update(&listing.id, "owner", deactivate).await.unwrap();

        assert!(matches!(directory.get(&listing.id, None).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            directory.get(&listing.id, Some("stranger")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(directory.get(&listing.id, Some("owner")).await.is_ok());
        assert!(directory.get_for_owner("owner").await.is_ok());
        assert!(directory.find(&VendorFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_for_owner_without_listing() {
        let directory = VendorDirectory::new(MemoryStore::new());

        let result = directory.get_for_owner("nobody").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}

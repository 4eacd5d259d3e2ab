use crate::models::{Category, PriceTier, VendorFilter, VendorListing};

/// Inactive listings are invisible to every query except the owner's own lookups
#[inline]
pub fn is_visible(listing: &VendorListing) -> bool {
    listing.active
}

#[inline]
pub fn matches_category(listing: &VendorListing, category: Category) -> bool {
    listing.category == category
}

/// Case-insensitive substring match, so "Fremont" matches "Fremont, CA"
///
/// An empty needle matches every location.
#[inline]
pub fn matches_location(listing: &VendorListing, needle: &str) -> bool {
    listing.location.to_lowercase().contains(&needle.to_lowercase())
}

/// Check the listing's tier against a budget ceiling
///
/// A missing or malformed listing tier is treated as `default_tier`.
#[inline]
pub fn within_budget(listing: &VendorListing, budget: PriceTier, default_tier: PriceTier) -> bool {
    listing.price_tier().unwrap_or(default_tier) <= budget
}

/// Free-text match against business name or description
#[inline]
pub fn matches_search(listing: &VendorListing, text: &str) -> bool {
    let text = text.to_lowercase();
    listing.business_name.to_lowercase().contains(&text)
        || listing.description.to_lowercase().contains(&text)
}

/// Check a listing against a directory filter
///
/// Used by stores that evaluate filters in process.
pub fn matches_filter(listing: &VendorListing, filter: &VendorFilter) -> bool {
    if !is_visible(listing) {
        return false;
    }

    if let Some(category) = filter.category {
        if !matches_category(listing, category) {
            return false;
        }
    }

    if let Some(location) = &filter.location {
        if !matches_location(listing, location) {
            return false;
        }
    }

    // Exact tier match, not a ceiling
    if let Some(tier) = filter.price_range {
        if listing.price_tier() != Some(tier) {
            return false;
        }
    }

    if let Some(search) = &filter.search {
        if !matches_search(listing, search) {
            return false;
        }
    }

    true
}

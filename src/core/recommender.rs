use crate::core::filters::{is_visible, matches_category, matches_location, within_budget};
use crate::models::{Category, PriceTier, Recommendations, VendorListing};

/// Criteria taken from an event (or supplied directly by the caller)
#[derive(Debug, Clone)]
pub struct RecommendationCriteria {
    pub location: String,
    pub budget: PriceTier,
    pub categories_needed: Vec<String>,
}

impl RecommendationCriteria {
    /// Build criteria from loosely-typed input; an unusable budget falls back to the default tier
    pub fn new(location: &str, budget: Option<&serde_json::Value>, categories_needed: Vec<String>) -> Self {
        let budget = budget.and_then(PriceTier::from_json).unwrap_or_default();
        Self {
            location: location.to_string(),
            budget,
            categories_needed,
        }
    }
}

/// Vendor ranking pipeline
///
/// # Pipeline Stages
/// 1. Visibility, category and location (case-insensitive substring)
/// 2. Budget ceiling on price tier
/// 3. Rating, descending. The sort is stable so retrieval order breaks ties.
/// 4. Truncation to `max_per_category`
///
/// Every requested category appears in the output, possibly with no listings.
#[derive(Debug, Clone)]
pub struct Recommender {
    max_per_category: usize,
    default_tier: PriceTier,
}

impl Recommender {
    pub fn new(max_per_category: usize) -> Self {
        Self {
            max_per_category,
            default_tier: PriceTier::default(),
        }
    }

    pub fn recommend(&self, criteria: &RecommendationCriteria, candidates: &[VendorListing]) -> Recommendations {
        let mut recommendations = Recommendations::new();

        for name in &criteria.categories_needed {
            let ranked = match name.parse::<Category>() {
                Ok(category) => self.rank_category(category, criteria, candidates),
                Err(_) => {
                    tracing::debug!("Unknown category requested: {}", name);
                    Vec::new()
                }
            };
            recommendations.insert(name.clone(), ranked);
        }

        recommendations
    }

    fn rank_category(
        &self,
        category: Category,
        criteria: &RecommendationCriteria,
        candidates: &[VendorListing],
    ) -> Vec<VendorListing> {
        let mut selected: Vec<&VendorListing> = candidates
            .iter()
            // Stage 1
            .filter(|listing| is_visible(listing))
            .filter(|listing| matches_category(listing, category))
            .filter(|listing| matches_location(listing, &criteria.location))
            // Stage 2
            .filter(|listing| within_budget(listing, criteria.budget, self.default_tier))
            .collect();

        // Stage 3: slice::sort_by is stable
        selected.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Stage 4
        selected
            .into_iter()
            .take(self.max_per_category)
            .cloned()
            .collect()
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_listing(id: &str, category: Category, location: &str, tier: &str, rating: f64) -> VendorListing {
        VendorListing {
            id: id.to_string(),
            owner_account_id: format!("owner-{}", id),
            business_name: format!("Vendor {}", id),
            category,
            description: String::new(),
            location: location.to_string(),
            price_range: tier.to_string(),
            price_estimate: String::new(),
            services: vec![],
            portfolio_images: vec![],
            contact_phone: String::new(),
            contact_email: String::new(),
            rating,
            review_count: 10,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn criteria(budget: PriceTier, categories: &[&str]) -> RecommendationCriteria {
        RecommendationCriteria {
            location: "Fremont".to_string(),
            budget,
            categories_needed: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn ids(listings: &[VendorListing]) -> Vec<&str> {
        listings.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_budget_excludes_higher_tier() {
        let recommender = Recommender::default();
        let candidates = vec![
            create_listing("A", Category::Venue, "Fremont, CA", "$$", 4.9),
            create_listing("B", Category::Venue, "Fremont, CA", "$$$", 5.0),
        ];

        let result = recommender.recommend(&criteria(PriceTier::Two, &["venue", "catering"]), &candidates);

        assert_eq!(ids(&result["venue"]), vec!["A"]);
        assert!(result["catering"].is_empty());
    }

    #[test]
    fn test_sorted_by_rating_and_truncated() {
        let recommender = Recommender::default();
        let candidates = vec![
            create_listing("1", Category::Catering, "Fremont, CA", "$", 4.1),
            create_listing("2", Category::Catering, "Fremont, CA", "$", 4.8),
            create_listing("3", Category::Catering, "Fremont, CA", "$", 3.9),
            create_listing("4", Category::Catering, "Fremont, CA", "$", 4.5),
            create_listing("5", Category::Catering, "Fremont, CA", "$", 4.6),
        ];

        let result = recommender.recommend(&criteria(PriceTier::Four, &["catering"]), &candidates);

        assert_eq!(ids(&result["catering"]), vec!["2", "5", "4"]);
    }

    #[test]
    fn test_ties_keep_retrieval_order() {
        let recommender = Recommender::default();
        let candidates = vec![
            create_listing("first", Category::Musicians, "Fremont, CA", "$$", 4.5),
            create_listing("second", Category::Musicians, "Fremont, CA", "$$", 4.5),
            create_listing("third", Category::Musicians, "Fremont, CA", "$$", 4.5),
            create_listing("fourth", Category::Musicians, "Fremont, CA", "$$", 4.5),
        ];

        let result = recommender.recommend(&criteria(PriceTier::Two, &["musicians"]), &candidates);

        assert_eq!(ids(&result["musicians"]), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unknown_category_yields_empty_entry() {
        let recommender = Recommender::default();
        let candidates = vec![create_listing("A", Category::Venue, "Fremont, CA", "$", 4.0)];

        let result = recommender.recommend(&criteria(PriceTier::Two, &["florist", "venue"]), &candidates);

        assert_eq!(result.len(), 2);
        assert!(result["florist"].is_empty());
        assert_eq!(result["venue"].len(), 1);
    }

    #[test]
    fn test_location_and_activity_filtering() {
        let recommender = Recommender::default();
        let mut inactive = create_listing("inactive", Category::Venue, "Fremont, CA", "$", 5.0);
        inactive.active = false;
        let candidates = vec![
            inactive,
            create_listing("elsewhere", Category::Venue, "Sunnyvale, CA", "$", 5.0),
            create_listing("local", Category::Venue, "FREMONT, CA", "$", 3.0),
        ];

        let result = recommender.recommend(&criteria(PriceTier::Two, &["venue"]), &candidates);

        assert_eq!(ids(&result["venue"]), vec!["local"]);
    }

    #[test]
    fn test_criteria_with_malformed_budget_defaults_to_tier_two() {
        let bad = serde_json::json!("lots");
        let criteria = RecommendationCriteria::new("Fremont", Some(&bad), vec!["venue".to_string()]);
        assert_eq!(criteria.budget, PriceTier::Two);

        let missing = RecommendationCriteria::new("Fremont", None, vec![]);
        assert_eq!(missing.budget, PriceTier::Two);

        let numeric = serde_json::json!(4);
        let criteria = RecommendationCriteria::new("Fremont", Some(&numeric), vec![]);
        assert_eq!(criteria.budget, PriceTier::Four);
    }
}

// Criterion benchmarks for the recommendation pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use arangetram_planner::core::{filters::matches_filter, RecommendationCriteria, Recommender};
use arangetram_planner::models::{Category, PriceTier, VendorFilter, VendorListing};
use chrono::Utc;

const LOCATIONS: [&str; 5] = ["Fremont, CA", "San Jose, CA", "Cupertino, CA", "Milpitas, CA", "Sunnyvale, CA"];
const TIERS: [&str; 4] = ["$", "$$", "$$$", "$$$$"];

fn create_listing(id: usize) -> VendorListing {
    VendorListing {
        id: id.to_string(),
        owner_account_id: format!("owner-{}", id),
        business_name: format!("Vendor {}", id),
        category: Category::ALL[id % Category::ALL.len()],
        description: "Classical dance specialists".to_string(),
        location: LOCATIONS[id % LOCATIONS.len()].to_string(),
        price_range: TIERS[(id / 2) % TIERS.len()].to_string(),
        price_estimate: String::new(),
        services: vec![],
        portfolio_images: vec![],
        contact_phone: String::new(),
        contact_email: String::new(),
        rating: ((id * 31) % 50) as f64 / 10.0,
        review_count: (id % 100) as u32,
        active: id % 11 != 0,
        created_at: Utc::now(),
    }
}

fn create_criteria() -> RecommendationCriteria {
    RecommendationCriteria {
        location: "Fremont".to_string(),
        budget: PriceTier::Three,
        categories_needed: Category::ALL.iter().map(|c| c.as_str().to_string()).collect(),
    }
}

fn bench_recommend(c: &mut Criterion) {
    let recommender = Recommender::default();
    let criteria = create_criteria();

    let mut group = c.benchmark_group("recommend");

    for candidate_count in [10, 100, 1000, 5000].iter() {
        let candidates: Vec<VendorListing> = (0..*candidate_count).map(create_listing).collect();

        group.bench_with_input(
            BenchmarkId::new("all_categories", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| recommender.recommend(black_box(&criteria), black_box(&candidates)));
            },
        );
    }

    group.finish();
}

fn bench_directory_filter(c: &mut Criterion) {
    let candidates: Vec<VendorListing> = (0..1000).map(create_listing).collect();
    let filter = VendorFilter {
        category: Some(Category::Catering),
        location: Some("san jose".to_string()),
        price_range: Some(PriceTier::Two),
        search: Some("dance".to_string()),
        ..VendorFilter::default()
    };

    c.bench_function("directory_filter_1000_listings", |b| {
        b.iter(|| {
            let matched: Vec<_> = candidates
                .iter()
                .filter(|l| matches_filter(l, black_box(&filter)))
                .collect();
            black_box(matched)
        });
    });
}

criterion_group!(benches, bench_recommend, bench_directory_filter);

criterion_main!(benches);

use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::auth::MaybeIdentity;
use crate::core::RecommendationCriteria;
use crate::error::ServiceResult;
use crate::models::{
    ChatRequest, ChatResponse, RecommendationRequest, RecommendationResponse, Recommendations,
    VendorFilter, VendorListing,
};
use crate::routes::AppState;
use crate::services::{CacheKey, Store};

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/ai/recommendations", web::post().to(recommend::<S>))
        .route("/ai/chat", web::post().to(chat::<S>));
}

/// Top-rated listings per category within budget and location
///
/// POST /api/v1/ai/recommendations
///
/// Request body:
/// ```json
/// {
///   "event_date": "2026-06-15",
///   "guest_count": 150,
///   "budget": "$$",
///   "location": "Fremont",
///   "categories_needed": ["venue", "catering"]
/// }
/// ```
async fn recommend<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<RecommendationRequest>,
    _caller: MaybeIdentity,
) -> ServiceResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let criteria = RecommendationCriteria::new(&req.location, req.budget.as_ref(), req.categories_needed);

    // Results are only cached in the shared tier, where every instance's
    // vendor writes can invalidate them
    let cache_key = state.cache.has_l2().then(|| CacheKey::recommendations(&criteria));

    if let Some(key) = &cache_key {
        if let Ok(recommendations) = state.cache.get::<Recommendations>(key).await {
            tracing::debug!("Serving cached recommendations: {}", key);
            return Ok(HttpResponse::Ok().json(RecommendationResponse { recommendations }));
        }
    }

    // The store narrows by location; category and budget are ranked in process
    let filter = VendorFilter {
        location: Some(criteria.location.clone()),
        limit: usize::MAX,
        ..VendorFilter::default()
    };
    let candidates = state.directory.find(&filter).await?;
    let recommendations = state.recommender.recommend(&criteria, &candidates);

    tracing::info!(
        "Recommended vendors for {} categories from {} candidates (budget {}, location {:?})",
        recommendations.len(),
        candidates.len(),
        criteria.budget,
        criteria.location
    );

    if let Some(key) = &cache_key {
        if let Err(e) = state.cache.set(key, &recommendations).await {
            tracing::warn!("Failed to cache recommendations: {}", e);
        }
    }

    Ok(HttpResponse::Ok().json(RecommendationResponse { recommendations }))
}

/// Planning assistant
///
/// POST /api/v1/ai/chat
///
/// Always answers 200 once the request is valid; upstream failures come
/// back as a fixed apology in `response`.
async fn chat<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<ChatRequest>,
    caller: MaybeIdentity,
) -> ServiceResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let vendors = directory_snapshot(&state).await;
    let response = state
        .assistant
        .reply(
            &req.message,
            req.event_context.as_ref(),
            &req.history,
            &vendors,
            caller.account_id(),
        )
        .await;

    Ok(HttpResponse::Ok().json(ChatResponse { response }))
}

/// Active listings for the assistant prompt, cached between calls when Redis is configured
///
/// A store failure leaves the prompt without vendors rather than failing the chat.
async fn directory_snapshot<S: Store>(state: &AppState<S>) -> Vec<VendorListing> {
    let shared = state.cache.has_l2();
    if shared {
        if let Ok(vendors) = state.cache.get::<Vec<VendorListing>>(CacheKey::DIRECTORY_SNAPSHOT).await {
            return vendors;
        }
    }

    let filter = VendorFilter {
        limit: state.assistant.max_vendors(),
        ..VendorFilter::default()
    };

    match state.directory.find(&filter).await {
        Ok(vendors) => {
            if shared {
                if let Err(e) = state.cache.set(CacheKey::DIRECTORY_SNAPSHOT, &vendors).await {
                    tracing::warn!("Failed to cache directory snapshot: {}", e);
                }
            }
            vendors
        }
        Err(e) => {
            tracing::warn!("Building chat prompt without vendors: {}", e);
            Vec::new()
        }
    }
}

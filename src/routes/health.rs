use actix_web::{web, HttpResponse, Responder};
use crate::models::{CategoriesResponse, Category, HealthResponse};
use crate::routes::AppState;
use crate::services::Store;

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check::<S>))
        .route("/categories", web::get().to(list_categories));
}

/// Health check endpoint
async fn health_check<S: Store>(state: web::Data<AppState<S>>) -> impl Responder {
    let store_healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/categories
async fn list_categories() -> impl Responder {
    HttpResponse::Ok().json(CategoriesResponse {
        categories: Category::ALL.into_iter().map(Into::into).collect(),
    })
}

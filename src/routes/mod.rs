// Route exports
pub mod assistant;
pub mod auth;
pub mod bookings;
pub mod events;
pub mod health;
pub mod vendors;

use actix_web::web;
use std::sync::Arc;
use crate::auth::IdentityContext;
use crate::core::{BookingEngine, BookingPolicy, EventPlanner, Recommender, VendorDirectory};
use crate::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use crate::services::{AssistantGateway, CacheManager, Store};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub cache: Arc<CacheManager>,
    pub assistant: Arc<AssistantGateway>,
    pub identity: IdentityContext,
    pub recommender: Recommender,
    pub bookings: BookingEngine<S>,
    pub directory: VendorDirectory<S>,
    pub events: EventPlanner<S>,
}

impl<S: Store> AppState<S> {
    pub fn new(
        store: S,
        cache: Arc<CacheManager>,
        assistant: Arc<AssistantGateway>,
        identity: IdentityContext,
        recommender: Recommender,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            bookings: BookingEngine::new(store.clone(), policy),
            directory: VendorDirectory::new(store.clone()),
            events: EventPlanner::new(store.clone()),
            store,
            cache,
            assistant,
            identity,
            recommender,
        }
    }
}

/// Register state, extractor configs and every route
///
/// Used by `main` and by the HTTP tests so both run the same app.
pub fn configure_app<S: Store>(state: AppState<S>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state.identity.clone()))
            .app_data(web::Data::new(state))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .configure(configure_routes::<S>);
    }
}

pub fn configure_routes<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure::<S>)
            .configure(auth::configure::<S>)
            .configure(vendors::configure::<S>)
            .configure(events::configure::<S>)
            .configure(bookings::configure::<S>)
            .configure(assistant::configure::<S>),
    );
}

use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::auth::Identity;
use crate::error::ServiceResult;
use crate::models::{CreateEventRequest, UpdateEventRequest};
use crate::routes::AppState;
use crate::services::Store;

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(create_event::<S>))
        .route("/events", web::get().to(list_events::<S>))
        .route("/events/{id}", web::get().to(get_event::<S>))
        .route("/events/{id}", web::put().to(update_event::<S>))
        .route("/events/{id}/vendors/{vendor_id}", web::post().to(add_vendor::<S>))
        .route("/events/{id}/vendors/{vendor_id}", web::delete().to(remove_vendor::<S>));
}

async fn create_event<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    body: web::Json<CreateEventRequest>,
) -> ServiceResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let event = state.events.create(&identity.account_id, req).await?;
    Ok(HttpResponse::Ok().json(event))
}

async fn list_events<S: Store>(state: web::Data<AppState<S>>, identity: Identity) -> ServiceResult<HttpResponse> {
    let events = state.events.list_for_owner(&identity.account_id).await?;
    Ok(HttpResponse::Ok().json(events))
}

async fn get_event<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let event = state.events.get(&path, &identity.account_id).await?;
    Ok(HttpResponse::Ok().json(event))
}

async fn update_event<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdateEventRequest>,
) -> ServiceResult<HttpResponse> {
    let patch = body.into_inner();
    patch.validate()?;

    let event = state.events.update(&path, &identity.account_id, patch).await?;
    Ok(HttpResponse::Ok().json(event))
}

/// POST /api/v1/events/{id}/vendors/{vendor_id}
async fn add_vendor<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> ServiceResult<HttpResponse> {
    let (event_id, vendor_id) = path.into_inner();
    let event = state
        .events
        .add_vendor(&event_id, &identity.account_id, &vendor_id)
        .await?;
    Ok(HttpResponse::Ok().json(event))
}

/// DELETE /api/v1/events/{id}/vendors/{vendor_id}
async fn remove_vendor<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> ServiceResult<HttpResponse> {
    let (event_id, vendor_id) = path.into_inner();
    let event = state
        .events
        .remove_vendor(&event_id, &identity.account_id, &vendor_id)
        .await?;
    Ok(HttpResponse::Ok().json(event))
}

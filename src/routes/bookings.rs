use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::auth::Identity;
use crate::core::BookingDecision;
use crate::error::ServiceResult;
use crate::models::{CreateBookingRequest, UpdateBookingRequest};
use crate::routes::AppState;
use crate::services::Store;

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/bookings", web::post().to(create_booking::<S>))
        .route("/bookings/user", web::get().to(requester_bookings::<S>))
        .route("/bookings/vendor", web::get().to(vendor_bookings::<S>))
        .route("/bookings/{id}", web::put().to(respond_to_booking::<S>));
}

/// Request a vendor for an event
///
/// POST /api/v1/bookings
///
/// Request body:
/// ```json
/// {
///   "event_id": "string",
///   "vendor_id": "string",
///   "message": "string"
/// }
/// ```
async fn create_booking<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    body: web::Json<CreateBookingRequest>,
) -> ServiceResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let booking = state
        .bookings
        .create(&identity.account_id, &req.event_id, &req.vendor_id, req.message)
        .await?;

    Ok(HttpResponse::Ok().json(booking))
}

/// Bookings the caller has requested
async fn requester_bookings<S: Store>(state: web::Data<AppState<S>>, identity: Identity) -> ServiceResult<HttpResponse> {
    let bookings = state.bookings.list_for_requester(&identity.account_id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// Bookings against the caller's vendor listing
async fn vendor_bookings<S: Store>(state: web::Data<AppState<S>>, identity: Identity) -> ServiceResult<HttpResponse> {
    let bookings = state.bookings.list_for_vendor_owner(&identity.account_id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// Accept or decline a pending booking
///
/// PUT /api/v1/bookings/{id}
///
/// Request body:
/// ```json
/// {
///   "status": "accepted",
///   "response_message": "string"
/// }
/// ```
async fn respond_to_booking<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdateBookingRequest>,
) -> ServiceResult<HttpResponse> {
    let req = body.into_inner();
    let decision = BookingDecision {
        status: req.status,
        response_message: req.response_message,
    };

    let booking = state
        .bookings
        .transition(&path, &identity.account_id, decision)
        .await?;

    Ok(HttpResponse::Ok().json(booking))
}

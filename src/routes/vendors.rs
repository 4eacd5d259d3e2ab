use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::auth::{Identity, MaybeIdentity};
use crate::error::ServiceResult;
use crate::models::{CreateVendorRequest, UpdateVendorRequest, VendorFilter, VendorQuery};
use crate::routes::AppState;
use crate::services::Store;

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/vendors", web::get().to(list_vendors::<S>))
        .route("/vendors", web::post().to(create_vendor::<S>))
        .route("/vendors/my/profile", web::get().to(my_profile::<S>))
        .route("/vendors/{id}", web::get().to(get_vendor::<S>))
        .route("/vendors/{id}", web::put().to(update_vendor::<S>));
}

/// Directory lookup
///
/// GET /api/v1/vendors?category=venue&location=Fremont&price_range=$$&search=hall
async fn list_vendors<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<VendorQuery>,
) -> ServiceResult<HttpResponse> {
    let query = query.into_inner();
    let filter = VendorFilter {
        category: query.category,
        location: query.location,
        price_range: query.price_range,
        search: query.search,
        ..VendorFilter::default()
    };

    let listings = state.directory.find(&filter).await?;
    Ok(HttpResponse::Ok().json(listings))
}

async fn my_profile<S: Store>(state: web::Data<AppState<S>>, identity: Identity) -> ServiceResult<HttpResponse> {
    let listing = state.directory.get_for_owner(&identity.account_id).await?;
    Ok(HttpResponse::Ok().json(listing))
}

async fn get_vendor<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<String>,
    viewer: MaybeIdentity,
) -> ServiceResult<HttpResponse> {
    let listing = state.directory.get(&path, viewer.account_id()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

async fn create_vendor<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    body: web::Json<CreateVendorRequest>,
) -> ServiceResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let listing = state
        .directory
        .create(&identity.account_id, identity.role, req)
        .await?;
    state.cache.invalidate_directory().await;

    Ok(HttpResponse::Ok().json(listing))
}

async fn update_vendor<S: Store>(
    state: web::Data<AppState<S>>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdateVendorRequest>,
) -> ServiceResult<HttpResponse> {
    let patch = body.into_inner();
    patch.validate()?;

    let listing = state.directory.update(&path, &identity.account_id, patch).await?;
    state.cache.invalidate_directory().await;

    Ok(HttpResponse::Ok().json(listing))
}

use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::auth::Identity;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Account, AccountSummary, GuestRequest, TokenResponse};
use crate::routes::AppState;
use crate::services::Store;

pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/guest", web::post().to(create_guest::<S>))
        .route("/auth/me", web::get().to(me::<S>));
}

/// Create a guest account and return a token for it
///
/// POST /api/v1/auth/guest
///
/// The body is optional; `{"name": "..."}` overrides the default "Guest".
async fn create_guest<S: Store>(
    state: web::Data<AppState<S>>,
    body: Option<web::Json<GuestRequest>>,
) -> ServiceResult<HttpResponse> {
    let req = body.map(web::Json::into_inner).unwrap_or(GuestRequest {
        name: "Guest".to_string(),
    });
    req.validate()?;

    let account = Account::guest(&req.name);
    state.store.insert_account(&account).await?;
    let token = state.identity.issue(&account.id, account.role)?;

    tracing::info!("Guest account {} created", account.id);

    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        user: account.into(),
    }))
}

/// GET /api/v1/auth/me
async fn me<S: Store>(state: web::Data<AppState<S>>, identity: Identity) -> ServiceResult<HttpResponse> {
    let account = state
        .store
        .get_account(&identity.account_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(AccountSummary::from(account)))
}

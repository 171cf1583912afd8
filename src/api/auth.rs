use actix_web::{web, HttpResponse, ResponseError};
use serde::Serialize;

use crate::models::{Principal, UserProfile};
use crate::services::auth_service;
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[utoipa::path(
    post,
    path = "/api/auth/session",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed in; user record created on first visit", body = SessionResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn sign_in(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());

    match auth_service::sign_in(state.store(), principal.as_ref()).await {
        Ok(user) => HttpResponse::Ok().json(SessionResponse {
            success: true,
            user,
        }),
        Err(e) => {
            log::warn!("❌ Sign-in failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Signed out")
    )
)]
pub async fn sign_out(principal: Option<web::ReqData<Principal>>) -> HttpResponse {
    if let Some(p) = principal {
        auth_service::sign_out(&p);
    }

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Signed out"
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = SessionResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No user record yet")
    )
)]
pub async fn get_me(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());

    match auth_service::get_current_user(state.store(), principal.as_ref()).await {
        Ok(user) => HttpResponse::Ok().json(SessionResponse {
            success: true,
            user,
        }),
        Err(e) => {
            log::warn!("❌ GET /auth/me failed: {}", e);
            e.error_response()
        }
    }
}

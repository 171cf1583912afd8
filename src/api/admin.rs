use actix_web::{web, HttpResponse, ResponseError};

use crate::models::Principal;
use crate::services::role_service::{self, SetRoleRequest};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/admin/set-role",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated"),
        (status = 400, description = "UID and role are required, or role unknown"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Admin access required"),
        (status = 501, description = "Role backend not configured")
    )
)]
pub async fn set_role(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    request: web::Json<SetRoleRequest>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());
    if let Err(e) = role_service::require_admin(principal.as_ref()) {
        return e.error_response();
    }

    match role_service::set_role(state.role_admin.as_ref(), &request).await {
        Ok(message) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": message
        })),
        Err(e) => {
            log::warn!("❌ set-role failed: {}", e);
            e.error_response()
        }
    }
}

use actix_web::{web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

use crate::api::metrics;
use crate::models::{
    CreateQrCodeRequest, LinkQrCodeRequest, Principal, QrCodeResponse, QrCodeUrlResponse,
    QrProfile,
};
use crate::services::{qr_service, role_service};
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QrCodeQuery {
    pub id: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QrCodeListResponse {
    pub success: bool,
    pub codes: Vec<QrCodeResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QrCodeDetailResponse {
    pub success: bool,
    pub code: QrCodeResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QrProfileResponse {
    pub success: bool,
    pub profile: QrProfile,
}

// ==================== LEGACY URL GENERATOR ====================

#[utoipa::path(
    get,
    path = "/api/qr-codes",
    tag = "QR Codes",
    params(QrCodeQuery),
    responses(
        (status = 200, description = "URL to print on the label", body = QrCodeUrlResponse),
        (status = 400, description = "QR Code ID is required")
    )
)]
pub async fn get_qr_code_url(
    state: web::Data<AppState>,
    query: web::Query<QrCodeQuery>,
) -> HttpResponse {
    let code_id = query.id.as_deref().unwrap_or_default();

    match qr_service::qr_code_url(&state.config.public_base_url, code_id) {
        Ok(mut url) => {
            url.message = "Use this URL to generate QR codes for t-shirt production".to_string();
            HttpResponse::Ok().json(url)
        }
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/qr-codes",
    tag = "QR Codes",
    request_body = CreateQrCodeRequest,
    responses(
        (status = 200, description = "URL to print on the label", body = QrCodeUrlResponse),
        (status = 400, description = "QR Code ID missing or body unparsable")
    )
)]
pub async fn post_qr_code_url(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let request: CreateQrCodeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("POST /qr-codes unparsable body: {}", e);
            return AppError::InvalidBody.error_response();
        }
    };

    let code_id = request.qr_code_id.as_deref().unwrap_or_default();
    match qr_service::qr_code_url(&state.config.public_base_url, code_id) {
        Ok(url) => HttpResponse::Ok().json(url),
        Err(e) => e.error_response(),
    }
}

// ==================== PUBLIC PROFILE ====================

#[utoipa::path(
    get,
    path = "/api/profiles/qr/{code_id}",
    tag = "QR Codes",
    params(("code_id" = String, Path, description = "Printed QR code id")),
    responses(
        (status = 200, description = "Profile behind the label", body = QrProfileResponse),
        (status = 403, description = "The linked motto is private"),
        (status = 404, description = "Unknown or unlinked label, or no motto yet")
    )
)]
pub async fn get_profile_by_code(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let code_id = path.into_inner();

    match qr_service::resolve_profile_by_code(state.store(), &code_id).await {
        Ok(profile) => HttpResponse::Ok().json(QrProfileResponse {
            success: true,
            profile,
        }),
        Err(e) => {
            log::debug!("QR profile {} not resolved: {}", code_id, e);
            e.error_response()
        }
    }
}

// ==================== ADMIN ====================

#[utoipa::path(
    get,
    path = "/api/admin/qr-codes",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All labels, newest first", body = QrCodeListResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_qr_codes(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());
    if let Err(e) = role_service::require_admin(principal.as_ref()) {
        return e.error_response();
    }

    match qr_service::list_codes(state.store()).await {
        Ok(codes) => HttpResponse::Ok().json(QrCodeListResponse {
            success: true,
            codes: codes.into_iter().map(QrCodeResponse::from).collect(),
        }),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/qr-codes/{code_id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("code_id" = String, Path, description = "Printed QR code id")),
    responses(
        (status = 200, description = "Label", body = QrCodeDetailResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Label not found")
    )
)]
pub async fn get_qr_code(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    path: web::Path<String>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());
    if let Err(e) = role_service::require_admin(principal.as_ref()) {
        return e.error_response();
    }

    match qr_service::get_code(state.store(), &path).await {
        Ok(code) => HttpResponse::Ok().json(QrCodeDetailResponse {
            success: true,
            code: code.into(),
        }),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/qr-codes",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateQrCodeRequest,
    responses(
        (status = 201, description = "Label registered, unlinked", body = QrCodeDetailResponse),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Label already exists")
    )
)]
pub async fn create_qr_code(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    request: web::Json<CreateQrCodeRequest>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());
    if let Err(e) = role_service::require_admin(principal.as_ref()) {
        return e.error_response();
    }

    let code_id = request.qr_code_id.as_deref().unwrap_or_default();
    match qr_service::create_code_for_production(state.store(), code_id).await {
        Ok(code) => HttpResponse::Created().json(QrCodeDetailResponse {
            success: true,
            code: code.into(),
        }),
        Err(e) => {
            log::warn!("❌ QR code {} not registered: {}", code_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/qr-codes/{code_id}/link",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("code_id" = String, Path, description = "Printed QR code id")),
    request_body = LinkQrCodeRequest,
    responses(
        (status = 200, description = "Label linked", body = QrCodeDetailResponse),
        (status = 400, description = "User email is required"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Label already linked")
    )
)]
pub async fn link_qr_code(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    path: web::Path<String>,
    request: web::Json<LinkQrCodeRequest>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());
    if let Err(e) = role_service::require_admin(principal.as_ref()) {
        return e.error_response();
    }

    let email = request.user_email.as_deref().unwrap_or_default();
    match qr_service::link_code_to_user(state.store(), &path, email).await {
        Ok(code) => {
            metrics::increment_qr_codes_linked();
            HttpResponse::Ok().json(QrCodeDetailResponse {
                success: true,
                code: code.into(),
            })
        }
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::api::test_support::{admin, bearer, customer, test_app};

    #[actix_web::test]
    async fn test_legacy_get_builds_url() {
        let app = test_app!().await;

        let req = test::TestRequest::get()
            .uri("/api/qr-codes?id=tee42")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["qrCodeId"], "TEE42");
        assert_eq!(body["qrCodeUrl"], "http://localhost:3000/qr/TEE42");
    }

    #[actix_web::test]
    async fn test_legacy_get_normalizes_id() {
        let app = test_app!().await;

        // printed labels are upper-case, so the generated URL is too
        let req = test::TestRequest::get()
            .uri("/api/qr-codes?id=%20tee42%20")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["qrCodeId"], "TEE42");
        assert_eq!(body["qrCodeUrl"], "http://localhost:3000/qr/TEE42");
        assert_eq!(
            body["message"],
            "Use this URL to generate QR codes for t-shirt production"
        );
    }

    #[actix_web::test]
    async fn test_legacy_get_requires_id() {
        let app = test_app!().await;

        let req = test::TestRequest::get().uri("/api/qr-codes").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "QR Code ID is required");
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_legacy_post() {
        let app = test_app!().await;

        let req = test::TestRequest::post()
            .uri("/api/qr-codes")
            .set_json(json!({ "qrCodeId": "A B" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["qrCodeUrl"], "http://localhost:3000/qr/A%20B");

        let req = test::TestRequest::post()
            .uri("/api/qr-codes")
            .set_json(json!({}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/qr-codes")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(body["code"], "INVALID_BODY");
    }

    #[actix_web::test]
    async fn test_admin_links_label_and_profile_resolves() {
        let app = test_app!().await;

        // customer signs in and claims a motto
        let req = test::TestRequest::post()
            .uri("/api/auth/session")
            .insert_header(bearer(&customer()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "text": "Carry on", "id": "carryon", "visibility": "public" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // non-admins cannot link
        let req = test::TestRequest::post()
            .uri("/api/admin/qr-codes/shirt1/link")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "userEmail": "customer@mail.com" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/admin/qr-codes/shirt1/link")
            .insert_header(bearer(&admin()))
            .set_json(json!({ "userEmail": "customer@mail.com" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/admin/qr-codes/SHIRT1/link")
            .insert_header(bearer(&admin()))
            .set_json(json!({ "userEmail": "someone@mail.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "ALREADY_LINKED");

        let req = test::TestRequest::get()
            .uri("/api/profiles/qr/shirt1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["profile"]["motto"]["text"], "Carry on");
        assert_eq!(body["profile"]["name"], "Customer");
    }
}

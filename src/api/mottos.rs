use actix_web::{web, HttpResponse, ResponseError};
use serde::Serialize;

use crate::api::metrics;
use crate::models::{CreateMottoRequest, LikeOutcome, MottoResponse, MottoView, Principal};
use crate::services::{like_service, motto_service};
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateMottoResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MyMottoResponse {
    pub success: bool,
    pub motto: Option<MottoResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MottoDetailResponse {
    pub success: bool,
    #[serde(flatten)]
    pub view: MottoView,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: LikeOutcome,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeStatusResponse {
    pub success: bool,
    pub liked: bool,
}

#[utoipa::path(
    post,
    path = "/api/mottos",
    tag = "Mottos",
    security(("bearer_auth" = [])),
    request_body = CreateMottoRequest,
    responses(
        (status = 201, description = "Motto created", body = CreateMottoResponse),
        (status = 400, description = "Invalid id, visibility or text"),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "User already has a motto or the id is taken")
    )
)]
pub async fn create_motto(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    request: web::Json<CreateMottoRequest>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());
    log::info!("✍️  POST /mottos - id: {}", request.id);

    match motto_service::create_motto(state.store(), &request, principal.as_ref()).await {
        Ok(id) => {
            metrics::increment_mottos_created();
            HttpResponse::Created().json(CreateMottoResponse { success: true, id })
        }
        Err(e) => {
            log::warn!("❌ Motto '{}' not created: {}", request.id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/mottos/mine",
    tag = "Mottos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's motto, or null", body = MyMottoResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_my_motto(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
) -> HttpResponse {
    let principal = principal.map(|p| p.into_inner());

    match motto_service::get_motto_by_owner(state.store(), principal.as_ref()).await {
        Ok(motto) => HttpResponse::Ok().json(MyMottoResponse {
            success: true,
            motto: motto.map(MottoResponse::from),
        }),
        Err(e) => {
            log::warn!("❌ GET /mottos/mine failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/mottos/{id}",
    tag = "Mottos",
    params(("id" = String, Path, description = "Motto id")),
    responses(
        (status = 200, description = "Motto", body = MottoDetailResponse),
        (status = 403, description = "Motto is private"),
        (status = 404, description = "Motto not found")
    )
)]
pub async fn get_motto(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let principal = principal.map(|p| p.into_inner());

    match motto_service::get_motto_by_id(state.store(), &id, principal.as_ref()).await {
        Ok(view) => HttpResponse::Ok().json(MottoDetailResponse {
            success: true,
            view,
        }),
        Err(e) => {
            log::debug!("GET /mottos/{} refused: {}", id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/mottos/{id}/like",
    tag = "Mottos",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Motto id")),
    responses(
        (status = 200, description = "Like recorded, or already present", body = LikeResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Motto is private"),
        (status = 404, description = "Motto not found")
    )
)]
pub async fn like_motto(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let principal = principal.map(|p| p.into_inner());

    match like_service::like_motto(state.store(), &id, principal.as_ref()).await {
        Ok(outcome) => {
            if !outcome.already_liked {
                metrics::increment_likes_recorded();
            }
            HttpResponse::Ok().json(LikeResponse {
                success: true,
                outcome,
            })
        }
        Err(e) => {
            log::warn!("❌ Like on '{}' failed: {}", id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/mottos/{id}/like",
    tag = "Mottos",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Motto id")),
    responses(
        (status = 200, description = "Whether the caller liked the motto", body = LikeStatusResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Motto is private"),
        (status = 404, description = "Motto not found")
    )
)]
pub async fn get_like_status(
    state: web::Data<AppState>,
    principal: Option<web::ReqData<Principal>>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let principal = principal.map(|p| p.into_inner());

    match like_service::get_like_status(state.store(), &id, principal.as_ref()).await {
        Ok(liked) => HttpResponse::Ok().json(LikeStatusResponse {
            success: true,
            liked,
        }),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::api::test_support::{admin, bearer, customer, test_app};

    #[actix_web::test]
    async fn test_motto_lifecycle_over_http() {
        let app = test_app!().await;

        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .set_json(json!({ "text": "Hi", "id": "anon", "visibility": "public" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "text": " Quietly brave ", "id": "brave_1", "visibility": "private" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["id"], "brave_1");

        let req = test::TestRequest::get()
            .uri("/api/mottos/mine")
            .insert_header(bearer(&customer()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["motto"]["text"], "Quietly brave");
        assert_eq!(body["motto"]["likeCount"], 0);

        // private: anonymous and other users are refused
        let req = test::TestRequest::get().uri("/api/mottos/brave_1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "PRIVATE");

        let req = test::TestRequest::post()
            .uri("/api/mottos/brave_1/like")
            .insert_header(bearer(&admin()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/mottos/brave_1")
            .insert_header(bearer(&customer()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["isOwner"], true);
        assert_eq!(body["motto"]["visibility"], "private");
    }

    #[actix_web::test]
    async fn test_bad_bodies_get_json_errors() {
        let app = test_app!().await;

        // missing field reaches the ordered checks
        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "text": "x", "id": "abcd" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_VISIBILITY");

        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "text": 5, "id": "abcd", "visibility": "public" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_BODY");
        assert_eq!(body["error"], "Invalid request body");

        let req = test::TestRequest::post()
            .uri("/api/admin/set-role")
            .insert_header(bearer(&admin()))
            .insert_header(("content-type", "application/json"))
            .set_payload("{oops")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "INVALID_BODY");

        // a user who already has a motto hears that first, whatever the body lacks
        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "text": "Fine", "id": "fine", "visibility": "public" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "id": "abcd" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "ALREADY_EXISTS");
    }

    #[actix_web::test]
    async fn test_like_twice_over_http() {
        let app = test_app!().await;

        let req = test::TestRequest::post()
            .uri("/api/mottos")
            .insert_header(bearer(&customer()))
            .set_json(json!({ "text": "Onward", "id": "onward", "visibility": "public" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        for expected_already in [false, true] {
            let req = test::TestRequest::post()
                .uri("/api/mottos/onward/like")
                .insert_header(bearer(&admin()))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["alreadyLiked"], expected_already);
            assert_eq!(body["likeCount"], 1);
        }

        let req = test::TestRequest::get()
            .uri("/api/mottos/onward/like")
            .insert_header(bearer(&admin()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["liked"], true);

        let req = test::TestRequest::get().uri("/api/mottos/missing").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}

use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Motto Service API",
        version = "1.0.0",
        description = "One motto per user, likes, and printed QR labels linked to customer profiles.\n\n**Authentication:** send the identity provider's token as `Authorization: Bearer <token>`. Admin routes need the `admin` role claim."
    ),
    paths(
        // Auth
        crate::api::auth::sign_in,
        crate::api::auth::sign_out,
        crate::api::auth::get_me,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Mottos
        crate::api::mottos::create_motto,
        crate::api::mottos::get_my_motto,
        crate::api::mottos::get_motto,
        crate::api::mottos::like_motto,
        crate::api::mottos::get_like_status,

        // QR codes
        crate::api::qr_codes::get_qr_code_url,
        crate::api::qr_codes::post_qr_code_url,
        crate::api::qr_codes::get_profile_by_code,

        // Admin
        crate::api::qr_codes::list_qr_codes,
        crate::api::qr_codes::get_qr_code,
        crate::api::qr_codes::create_qr_code,
        crate::api::qr_codes::link_qr_code,
        crate::api::admin::set_role,
    ),
    components(
        schemas(
            crate::api::auth::SessionResponse,
            crate::models::UserProfile,

            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,

            crate::models::CreateMottoRequest,
            crate::models::MottoResponse,
            crate::models::MottoView,
            crate::models::Visibility,
            crate::models::LikeOutcome,
            crate::api::mottos::CreateMottoResponse,
            crate::api::mottos::MyMottoResponse,
            crate::api::mottos::MottoDetailResponse,
            crate::api::mottos::LikeResponse,
            crate::api::mottos::LikeStatusResponse,

            crate::models::CreateQrCodeRequest,
            crate::models::LinkQrCodeRequest,
            crate::models::QrCodeResponse,
            crate::models::QrCodeUrlResponse,
            crate::models::QrProfile,
            crate::api::qr_codes::QrCodeListResponse,
            crate::api::qr_codes::QrCodeDetailResponse,
            crate::api::qr_codes::QrProfileResponse,

            crate::services::role_service::SetRoleRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Sign-in session backed by the external identity provider."),
        (name = "Health", description = "Health check and Prometheus counters."),
        (name = "Mottos", description = "Create, read and like mottos."),
        (name = "QR Codes", description = "Label URLs and the public profile behind a scanned label."),
        (name = "Admin", description = "Operator screens: label registry, linking and role assignment."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Identity provider token"))
                        .build()
                ),
            );
        }
    }
}

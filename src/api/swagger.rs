use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carequest API",
        version = "1.0.0",
        description = "Diagnostic-center booking backend. \n\n**Authentication:** protected endpoints expect `Authorization: Bearer <token>` issued by `POST /jwt`.\n\n**Analytics:** platform totals are admin-only; category and popularity reports follow the configured stats access policy."
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Auth
        crate::api::auth::issue_token,

        // Users
        crate::api::users::admin_check,

        // Stats
        crate::api::stats::admin_stats,
        crate::api::stats::category_stats,
        crate::api::stats::popular_tests,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::AdminCheckResponse,
            crate::models::AdminStats,
            crate::models::CategoryStat,
            crate::models::PopularTest,
            crate::models::PaymentIntentRequest,
            crate::models::PaymentIntentResponse,
            crate::services::auth_service::TokenResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database connectivity."),
        (name = "Auth", description = "Credential issuing."),
        (name = "Users", description = "Identity records and the admin self-check."),
        (name = "Stats", description = "Dashboard analytics over users, tests, bookings and payments."),
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
                        .description(Some("Token from POST /jwt"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_routes() {
        let openapi = ApiDoc::openapi();
        for path in ["/health", "/jwt", "/users/admin/{email}", "/admin-stats", "/category-stats", "/popular-tests"] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = openapi.components.expect("components");
        assert!(components.schemas.contains_key("TokenResponse"));
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}

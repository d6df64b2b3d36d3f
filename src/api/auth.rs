use crate::services::auth_service::{TokenResponse, TokenService};
use crate::utils::AppError;
use actix_web::{web, HttpResponse};

/// POST /jwt - signs the posted identity payload into a one-hour credential
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body(
        content = Object,
        description = "Identity payload to embed, usually `{\"email\": ...}`",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Signed bearer credential", body = TokenResponse),
        (status = 400, description = "Payload is not a JSON object")
    )
)]
pub async fn issue_token(
    tokens: web::Data<TokenService>,
    payload: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let email = payload
        .get("email")
        .and_then(|e| e.as_str())
        .unwrap_or("N/A");
    log::info!("🔐 POST /jwt - email: {}", email);

    let token = tokens.issue(&payload)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

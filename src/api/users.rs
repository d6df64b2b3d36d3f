use crate::database::DocumentStore;
use crate::middleware::access::require_self;
use crate::models::{
    AdminCheckResponse, DeleteResponse, ExistingUserResponse, InsertResponse, SignUpRequest,
    StatusUpdateRequest, UpdateResponse, UserStatusResponse,
};
use crate::services::{user_service, Claims};
use crate::utils::{documents_to_json, AppError};
use actix_web::{web, HttpResponse};

/// GET /users - every identity (admin)
pub async fn list_users(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    log::info!("👥 GET /users");
    let users = user_service::list_users(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(users)))
}

#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "Email of the authenticated caller")),
    responses(
        (status = 200, description = "Whether the caller is an admin", body = AdminCheckResponse),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Invalid credential or another user's email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_check(
    store: web::Data<dyn DocumentStore>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    require_self(&claims, &email)?;

    let admin = user_service::is_admin(store.get_ref(), &email).await?;
    Ok(HttpResponse::Ok().json(AdminCheckResponse { admin }))
}

/// GET /users/status/{email} - status and role of an identity
pub async fn user_status(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::status_of(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(UserStatusResponse {
        status: user.status,
        role: user.role,
    }))
}

/// POST /users - sign-up, a no-op when the email is already registered
pub async fn sign_up(
    store: web::Data<dyn DocumentStore>,
    request: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /users - email: {}", request.email);

    match user_service::sign_up(store.get_ref(), request.into_inner()).await? {
        Some(id) => Ok(HttpResponse::Ok().json(InsertResponse::new(id))),
        None => Ok(HttpResponse::Ok().json(ExistingUserResponse {
            message: "user already exists".to_string(),
            inserted_id: None,
        })),
    }
}

/// DELETE /users/{id} (admin)
pub async fn delete_user(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /users/{}", path);
    let deleted = user_service::delete_user(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse::new(deleted)))
}

/// PATCH /users/admin/{id} - grants the admin role (admin)
pub async fn make_admin(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("⬆️ PATCH /users/admin/{}", path);
    let outcome = user_service::promote_to_admin(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(UpdateResponse::from(outcome)))
}

/// PATCH /users/status/{id} (admin)
pub async fn update_status(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
    request: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔁 PATCH /users/status/{} -> {}", path, request.status);
    let outcome = user_service::set_status(store.get_ref(), &path, &request.status).await?;
    Ok(HttpResponse::Ok().json(UpdateResponse::from(outcome)))
}

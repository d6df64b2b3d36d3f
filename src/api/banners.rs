use crate::database::DocumentStore;
use crate::models::{BannerRequest, DeleteResponse, InsertResponse, UpdateResponse};
use crate::services::banner_service;
use crate::utils::{document_to_json, documents_to_json, AppError};
use actix_web::{web, HttpResponse};

/// GET /banners
pub async fn list_banners(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    let banners = banner_service::list(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(banners)))
}

/// GET /banners/active
pub async fn active_banner(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    let banner = banner_service::active(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(document_to_json(banner)))
}

/// POST /banners (admin)
pub async fn create_banner(
    store: web::Data<dyn DocumentStore>,
    request: web::Json<BannerRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🖼️ POST /banners - {}", request.name);
    let id = banner_service::create(store.get_ref(), &request).await?;
    Ok(HttpResponse::Ok().json(InsertResponse::new(id)))
}

/// PATCH /banners/{id}/activate - makes this the only active banner (admin)
pub async fn activate_banner(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("✅ PATCH /banners/{}/activate", path);
    let outcome = banner_service::activate(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(UpdateResponse::from(outcome)))
}

/// DELETE /banners/{id} (admin)
pub async fn delete_banner(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /banners/{}", path);
    let deleted = banner_service::delete(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse::new(deleted)))
}

use crate::database::{Collection, DocumentStore};
use crate::services::catalog_service;
use crate::utils::{documents_to_json, AppError};
use actix_web::{web, HttpResponse};

async fn list(store: &dyn DocumentStore, collection: Collection) -> Result<HttpResponse, AppError> {
    let documents = catalog_service::list_all(store, collection).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(documents)))
}

/// GET /reviews
pub async fn list_reviews(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    list(store.get_ref(), Collection::Reviews).await
}

/// GET /doctors
pub async fn list_doctors(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    list(store.get_ref(), Collection::Doctors).await
}

/// GET /promotions
pub async fn list_promotions(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    list(store.get_ref(), Collection::Promotions).await
}

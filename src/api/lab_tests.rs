use crate::database::DocumentStore;
use crate::models::{DeleteResponse, InsertResponse, TestPayload, UpdateResponse};
use crate::services::catalog_service;
use crate::utils::{document_to_json, documents_to_json, AppError};
use actix_web::{web, HttpResponse};

/// GET /tests
pub async fn list_tests(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    let tests = catalog_service::list_tests(store.get_ref()).await?;
    log::info!("🧪 GET /tests - {} tests", tests.len());
    Ok(HttpResponse::Ok().json(documents_to_json(tests)))
}

/// GET /tests/{id}
pub async fn get_test(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let test = catalog_service::get_test(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(document_to_json(test)))
}

/// POST /tests (admin)
pub async fn create_test(
    store: web::Data<dyn DocumentStore>,
    payload: web::Json<TestPayload>,
) -> Result<HttpResponse, AppError> {
    log::info!("➕ POST /tests - {}", payload.name);
    let id = catalog_service::create_test(store.get_ref(), &payload).await?;
    Ok(HttpResponse::Ok().json(InsertResponse::new(id)))
}

/// PATCH /tests/{id} (admin)
pub async fn update_test(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
    payload: web::Json<TestPayload>,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️ PATCH /tests/{}", path);
    let outcome = catalog_service::update_test(store.get_ref(), &path, &payload).await?;
    Ok(HttpResponse::Ok().json(UpdateResponse::from(outcome)))
}

/// DELETE /tests/{id} (admin)
pub async fn delete_test(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /tests/{}", path);
    let deleted = catalog_service::delete_test(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse::new(deleted)))
}

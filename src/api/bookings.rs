use crate::database::DocumentStore;
use crate::models::{BookingRequest, BookingStatusUpdate, DeleteResponse, InsertResponse, UpdateResponse};
use crate::services::{booking_service, Claims};
use crate::utils::{documents_to_json, AppError};
use actix_web::{web, HttpResponse};

fn caller_email(claims: &Claims) -> Result<&str, AppError> {
    claims
        .email
        .as_deref()
        .ok_or_else(|| AppError::Forbidden("Forbidden access".to_string()))
}

/// GET /bookings - admins see every booking, users their own
pub async fn list_bookings(
    store: web::Data<dyn DocumentStore>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let email = caller_email(&claims)?;
    let bookings = booking_service::list_for(store.get_ref(), email).await?;
    log::info!("📋 GET /bookings - {} ({} bookings)", email, bookings.len());
    Ok(HttpResponse::Ok().json(documents_to_json(bookings)))
}

/// POST /bookings - books a test for the caller
pub async fn create_booking(
    store: web::Data<dyn DocumentStore>,
    claims: web::ReqData<Claims>,
    request: web::Json<BookingRequest>,
) -> Result<HttpResponse, AppError> {
    let email = caller_email(&claims)?;
    log::info!("📅 POST /bookings - {} books {}", email, request.book_id);

    let id = booking_service::create(store.get_ref(), email, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InsertResponse::new(id)))
}

/// PATCH /bookings/status/{id} (admin)
pub async fn update_booking_status(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
    update: web::Json<BookingStatusUpdate>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔁 PATCH /bookings/status/{} -> {}", path, update.status.as_str());
    let outcome = booking_service::update_status(store.get_ref(), &path, &update).await?;
    Ok(HttpResponse::Ok().json(UpdateResponse::from(outcome)))
}

/// DELETE /bookings/{id}
pub async fn delete_booking(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /bookings/{}", path);
    let deleted = booking_service::delete(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse::new(deleted)))
}

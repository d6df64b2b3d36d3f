use crate::database::DocumentStore;
use crate::middleware::access::require_self;
use crate::models::{InsertResponse, PaymentIntentRequest, PaymentIntentResponse, PaymentRequest};
use crate::services::{payment_service, Claims, PaymentProvider};
use crate::utils::{documents_to_json, AppError};
use actix_web::{web, HttpResponse};

/// POST /create-payment-intent
pub async fn create_payment_intent(
    provider: web::Data<PaymentProvider>,
    request: web::Json<PaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("💳 POST /create-payment-intent - price: {}", request.price);
    let client_secret = provider.create_payment_intent(request.price).await?;
    Ok(HttpResponse::Ok().json(PaymentIntentResponse { client_secret }))
}

/// POST /payments - records a completed payment for the caller
pub async fn record_payment(
    store: web::Data<dyn DocumentStore>,
    claims: web::ReqData<Claims>,
    request: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let email = claims
        .email
        .as_deref()
        .ok_or_else(|| AppError::Forbidden("Forbidden access".to_string()))?;
    log::info!("💰 POST /payments - {} paid {}", email, request.price);

    let id = payment_service::record_payment(store.get_ref(), email, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InsertResponse::new(id)))
}

/// GET /payments/{email} - the caller's own payment history
pub async fn payment_history(
    store: web::Data<dyn DocumentStore>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    require_self(&claims, &email)?;

    let payments = payment_service::history(store.get_ref(), &email).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(payments)))
}

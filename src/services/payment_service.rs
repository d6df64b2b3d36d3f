use crate::database::{Collection, DocumentStore};
use crate::models::PaymentRequest;
use crate::utils::AppError;
use mongodb::bson::{doc, to_document, Bson, DateTime as BsonDateTime, Document};
use serde::Deserialize;
use std::time::Duration;

const STRIPE_API_BASE: &str = "https://api.stripe.com";
const SERVER_OWNED_FIELDS: [&str; 5] = ["_id", "email", "price", "transactionId", "date"];

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    client_secret: String,
}

/// Converts a dollar price to whole cents, dropping any fraction of a cent.
pub fn amount_in_cents(price: f64) -> Result<i64, AppError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::InvalidRequest("Price must be a positive number".to_string()));
    }
    Ok((price * 100.0).trunc() as i64)
}

/// Client for the payment-intent provider (Stripe REST API).
#[derive(Clone)]
pub struct PaymentProvider {
    http: reqwest::Client,
    secret_key: Option<String>,
    api_base: String,
}

impl PaymentProvider {
    pub fn new(secret_key: Option<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        if secret_key.is_none() {
            log::warn!("⚠️  STRIPE_SECRET_KEY not set, payment intents are disabled");
        }

        Ok(Self {
            http,
            secret_key,
            api_base: STRIPE_API_BASE.to_string(),
        })
    }

    /// Creates a USD card payment intent and returns its client secret.
    pub async fn create_payment_intent(&self, price: f64) -> Result<String, AppError> {
        let amount = amount_in_cents(price)?;
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("STRIPE_SECRET_KEY is not set".to_string()))?;

        log::info!("💳 Creating payment intent for {} cents", amount);

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(secret_key)
            .form(&[
                ("amount", amount.to_string()),
                ("currency", "usd".to_string()),
                ("payment_method_types[]", "card".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::PaymentError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::PaymentError(format!("Provider returned {}: {}", status, body)));
        }

        let intent: StripePaymentIntent = response
            .json()
            .await
            .map_err(|e| AppError::PaymentError(format!("Invalid provider response: {}", e)))?;

        Ok(intent.client_secret)
    }
}

/// Appends a confirmed payment. Payments are never updated afterwards.
pub async fn record_payment(store: &dyn DocumentStore, email: &str, request: PaymentRequest) -> Result<Bson, AppError> {
    if !request.price.is_finite() || request.price < 0.0 {
        return Err(AppError::InvalidRequest("Price must be a non-negative number".to_string()));
    }

    let mut details = request.details;
    for field in SERVER_OWNED_FIELDS {
        details.remove(field);
    }

    let mut payment = to_document(&details)?;
    payment.insert("email", email);
    payment.insert("price", request.price);
    if let Some(transaction_id) = request.transaction_id {
        payment.insert("transactionId", transaction_id);
    }
    payment.insert("date", BsonDateTime::now());

    let id = store.insert_one(Collection::Payments, payment).await?;
    log::info!("✅ Payment recorded for {}", email);
    Ok(id)
}

pub async fn history(store: &dyn DocumentStore, email: &str) -> Result<Vec<Document>, AppError> {
    store.find(Collection::Payments, doc! { "email": email }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_amount_truncates_to_cents() {
        assert_eq!(amount_in_cents(25.5).unwrap(), 2550);
        assert_eq!(amount_in_cents(10.0).unwrap(), 1000);
        assert!(matches!(amount_in_cents(0.0), Err(AppError::InvalidRequest(_))));
        assert!(matches!(amount_in_cents(f64::NAN), Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_payment_intent_requires_key() {
        let provider = PaymentProvider::new(None).unwrap();
        let result = provider.create_payment_intent(12.0).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_recorded_payment_belongs_to_caller() {
        let store = MemoryStore::new();
        let request: PaymentRequest = serde_json::from_value(json!({
            "price": 42.0,
            "transactionId": "pi_123",
            "email": "spoofed@carequest.dev",
            "testName": "CBC",
        }))
        .unwrap();

        record_payment(&store, "ana@carequest.dev", request).await.unwrap();

        let mine = history(&store, "ana@carequest.dev").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].get_f64("price").unwrap(), 42.0);
        assert_eq!(mine[0].get_str("transactionId").unwrap(), "pi_123");
        assert!(history(&store, "spoofed@carequest.dev").await.unwrap().is_empty());
    }
}

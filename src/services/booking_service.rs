use crate::database::{parse_object_id, Collection, DocumentStore, UpdateOutcome};
use crate::models::{BookingRequest, BookingStatus, BookingStatusUpdate};
use crate::services::user_service;
use crate::utils::AppError;
use mongodb::bson::{doc, to_document, Bson, Document};

const SERVER_OWNED_FIELDS: [&str; 6] = ["_id", "email", "bookId", "finalPrice", "status", "report"];

/// Bookings visible to the caller: every booking for admins, otherwise
/// only the caller's own.
pub async fn list_for(store: &dyn DocumentStore, email: &str) -> Result<Vec<Document>, AppError> {
    if user_service::is_admin(store, email).await? {
        log::info!("📋 Listing all bookings for admin {}", email);
        store.find(Collection::Bookings, doc! {}).await
    } else {
        store.find(Collection::Bookings, doc! { "email": email }).await
    }
}

/// Books a catalog test for `email`. The referenced test must exist.
pub async fn create(store: &dyn DocumentStore, email: &str, request: BookingRequest) -> Result<Bson, AppError> {
    let test_id = parse_object_id(&request.book_id)?;
    if !request.final_price.is_finite() || request.final_price < 0.0 {
        return Err(AppError::InvalidRequest("finalPrice must be a non-negative number".to_string()));
    }

    store
        .find_one(Collection::Tests, doc! { "_id": test_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;

    let mut details = request.details;
    for field in SERVER_OWNED_FIELDS {
        details.remove(field);
    }

    let mut booking = to_document(&details)?;
    booking.insert("email", email);
    booking.insert("bookId", test_id.to_hex());
    booking.insert("finalPrice", request.final_price);
    booking.insert("status", BookingStatus::Pending.as_str());

    store.insert_one(Collection::Bookings, booking).await
}

pub async fn update_status(
    store: &dyn DocumentStore,
    id: &str,
    update: &BookingStatusUpdate,
) -> Result<UpdateOutcome, AppError> {
    let object_id = parse_object_id(id)?;
    let mut set = doc! { "status": update.status.as_str() };
    if let Some(report) = &update.report {
        set.insert("report", report.as_str());
    }

    store
        .update_one(Collection::Bookings, doc! { "_id": object_id }, set)
        .await
}

pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<u64, AppError> {
    let object_id = parse_object_id(id)?;
    store
        .delete_one(Collection::Bookings, doc! { "_id": object_id })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    async fn seed_test(store: &MemoryStore) -> String {
        store
            .insert_one(Collection::Tests, doc! { "name": "CBC", "category": "Blood" })
            .await
            .unwrap()
            .as_object_id()
            .unwrap()
            .to_hex()
    }

    fn request(book_id: &str) -> BookingRequest {
        serde_json::from_value(json!({
            "bookId": book_id,
            "finalPrice": 20.0,
            "testName": "CBC",
            "status": "Delivered",
            "email": "someone-else@carequest.dev",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_pending_status() {
        let store = MemoryStore::new();
        let test_id = seed_test(&store).await;

        create(&store, "ana@carequest.dev", request(&test_id)).await.unwrap();

        let bookings = list_for(&store, "ana@carequest.dev").await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].get_str("email").unwrap(), "ana@carequest.dev");
        assert_eq!(bookings[0].get_str("status").unwrap(), "Pending");
        assert_eq!(bookings[0].get_str("testName").unwrap(), "CBC");
    }

    #[tokio::test]
    async fn test_booking_unknown_test_is_not_found() {
        let store = MemoryStore::new();
        let result = create(&store, "ana@carequest.dev", request(&ObjectId::new().to_hex())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_admin_sees_every_booking() {
        let store = MemoryStore::new();
        let test_id = seed_test(&store).await;
        store
            .insert_one(Collection::Users, doc! { "email": "admin@carequest.dev", "role": "admin" })
            .await
            .unwrap();

        create(&store, "ana@carequest.dev", request(&test_id)).await.unwrap();
        create(&store, "bo@carequest.dev", request(&test_id)).await.unwrap();

        assert_eq!(list_for(&store, "admin@carequest.dev").await.unwrap().len(), 2);
        assert_eq!(list_for(&store, "bo@carequest.dev").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_update_stores_report() {
        let store = MemoryStore::new();
        let test_id = seed_test(&store).await;
        let id = create(&store, "ana@carequest.dev", request(&test_id)).await.unwrap();
        let hex = id.as_object_id().unwrap().to_hex();

        let update = BookingStatusUpdate {
            status: BookingStatus::Delivered,
            report: Some("https://files/report.pdf".to_string()),
        };
        update_status(&store, &hex, &update).await.unwrap();

        let booking = store
            .find_one(Collection::Bookings, doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(booking.get_str("status").unwrap(), "Delivered");
        assert_eq!(booking.get_str("report").unwrap(), "https://files/report.pdf");
    }
}

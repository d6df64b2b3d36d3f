use crate::database::{parse_object_id, Collection, DocumentStore, UpdateOutcome};
use crate::models::TestPayload;
use crate::utils::AppError;
use mongodb::bson::{doc, to_document, Bson, Document};

fn validate(test: &TestPayload) -> Result<(), AppError> {
    if test.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Test name is required".to_string()));
    }
    if !test.price.is_finite() || test.price < 0.0 {
        return Err(AppError::InvalidRequest("Price must be a non-negative number".to_string()));
    }
    if test.slots > test.capacity {
        return Err(AppError::InvalidRequest("Slots cannot exceed capacity".to_string()));
    }
    Ok(())
}

pub async fn list_tests(store: &dyn DocumentStore) -> Result<Vec<Document>, AppError> {
    store.find(Collection::Tests, doc! {}).await
}

pub async fn get_test(store: &dyn DocumentStore, id: &str) -> Result<Document, AppError> {
    let object_id = parse_object_id(id)?;
    store
        .find_one(Collection::Tests, doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))
}

pub async fn create_test(store: &dyn DocumentStore, test: &TestPayload) -> Result<Bson, AppError> {
    validate(test)?;
    store.insert_one(Collection::Tests, to_document(test)?).await
}

/// Replaces every catalog field of a test.
pub async fn update_test(store: &dyn DocumentStore, id: &str, test: &TestPayload) -> Result<UpdateOutcome, AppError> {
    let object_id = parse_object_id(id)?;
    validate(test)?;
    store
        .update_one(Collection::Tests, doc! { "_id": object_id }, to_document(test)?)
        .await
}

pub async fn delete_test(store: &dyn DocumentStore, id: &str) -> Result<u64, AppError> {
    let object_id = parse_object_id(id)?;
    store
        .delete_one(Collection::Tests, doc! { "_id": object_id })
        .await
}

/// Read-only listing for reviews, doctors and promotions.
pub async fn list_all(store: &dyn DocumentStore, collection: Collection) -> Result<Vec<Document>, AppError> {
    store.find(collection, doc! {}).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn blood_test() -> TestPayload {
        TestPayload {
            name: "Complete Blood Count".to_string(),
            image: "https://img/cbc.png".to_string(),
            description: "Full blood panel".to_string(),
            price: 25.0,
            date: "2026-11-02".to_string(),
            category: "Blood".to_string(),
            capacity: 20,
            slots: 12,
        }
    }

    #[tokio::test]
    async fn test_create_update_and_fetch() {
        let store = MemoryStore::new();
        let id = create_test(&store, &blood_test()).await.unwrap();
        let hex = id.as_object_id().unwrap().to_hex();

        let mut changed = blood_test();
        changed.price = 30.0;
        let outcome = update_test(&store, &hex, &changed).await.unwrap();
        assert_eq!(outcome.modified_count, 1);

        let stored = get_test(&store, &hex).await.unwrap();
        assert_eq!(stored.get_f64("price").unwrap(), 30.0);
        assert_eq!(stored.get_str("category").unwrap(), "Blood");
    }

    #[tokio::test]
    async fn test_missing_test_is_not_found() {
        let store = MemoryStore::new();
        let id = mongodb::bson::oid::ObjectId::new().to_hex();
        assert!(matches!(get_test(&store, &id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected() {
        let store = MemoryStore::new();
        let mut test = blood_test();
        test.slots = 40;
        assert!(matches!(
            create_test(&store, &test).await,
            Err(AppError::InvalidRequest(_))
        ));
    }
}

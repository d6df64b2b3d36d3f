use crate::database::{parse_object_id, Collection, DocumentStore, UpdateOutcome};
use crate::models::BannerRequest;
use crate::utils::AppError;
use mongodb::bson::{doc, to_document, Bson, Document};

pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Document>, AppError> {
    store.find(Collection::Banners, doc! {}).await
}

pub async fn active(store: &dyn DocumentStore) -> Result<Document, AppError> {
    store
        .find_one(Collection::Banners, doc! { "isActive": true })
        .await?
        .ok_or_else(|| AppError::NotFound("No active banner".to_string()))
}

pub async fn create(store: &dyn DocumentStore, banner: &BannerRequest) -> Result<Bson, AppError> {
    if !(0.0..=100.0).contains(&banner.coupon_rate) {
        return Err(AppError::InvalidRequest("couponRate must be between 0 and 100".to_string()));
    }

    let mut document = to_document(banner)?;
    document.insert("isActive", false);
    store.insert_one(Collection::Banners, document).await
}

/// Makes `id` the only active banner. Two separate writes: a concurrent
/// activation can briefly leave zero or two banners active.
pub async fn activate(store: &dyn DocumentStore, id: &str) -> Result<UpdateOutcome, AppError> {
    let object_id = parse_object_id(id)?;
    store
        .find_one(Collection::Banners, doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Banner not found".to_string()))?;

    store
        .update_many(Collection::Banners, doc! { "isActive": true }, doc! { "isActive": false })
        .await?;
    store
        .update_one(Collection::Banners, doc! { "_id": object_id }, doc! { "isActive": true })
        .await
}

pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<u64, AppError> {
    let object_id = parse_object_id(id)?;
    store
        .delete_one(Collection::Banners, doc! { "_id": object_id })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn banner(name: &str) -> BannerRequest {
        BannerRequest {
            name: name.to_string(),
            image: "https://img/banner.png".to_string(),
            title: "Winter checkup".to_string(),
            description: "Save on annual panels".to_string(),
            coupon_code: "WINTER10".to_string(),
            coupon_rate: 10.0,
        }
    }

    #[tokio::test]
    async fn test_activation_leaves_one_active_banner() {
        let store = MemoryStore::new();
        let first = create(&store, &banner("first")).await.unwrap();
        let second = create(&store, &banner("second")).await.unwrap();

        assert!(matches!(active(&store).await, Err(AppError::NotFound(_))));

        activate(&store, &first.as_object_id().unwrap().to_hex()).await.unwrap();
        activate(&store, &second.as_object_id().unwrap().to_hex()).await.unwrap();

        let current = active(&store).await.unwrap();
        assert_eq!(current.get_str("name").unwrap(), "second");
        let active_count = list(&store)
            .await
            .unwrap()
            .iter()
            .filter(|b| b.get_bool("isActive").unwrap_or(false))
            .count();
        assert_eq!(active_count, 1);
    }

    #[tokio::test]
    async fn test_coupon_rate_out_of_range() {
        let store = MemoryStore::new();
        let mut bad = banner("bad");
        bad.coupon_rate = 150.0;
        assert!(matches!(create(&store, &bad).await, Err(AppError::InvalidRequest(_))));
    }
}

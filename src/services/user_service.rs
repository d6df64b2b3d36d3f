use crate::database::{parse_object_id, Collection, DocumentStore, UpdateOutcome};
use crate::models::{Role, SignUpRequest, User, DEFAULT_STATUS};
use crate::utils::AppError;
use mongodb::bson::{doc, from_document, to_document, Bson, Document};

/// Profile keys a client may not set at sign-up.
const SERVER_OWNED_FIELDS: [&str; 4] = ["_id", "email", "role", "status"];

pub async fn find_by_email(store: &dyn DocumentStore, email: &str) -> Result<Option<User>, AppError> {
    let found = store
        .find_one(Collection::Users, doc! { "email": email })
        .await?;
    Ok(found.map(from_document::<User>).transpose()?)
}

pub async fn list_users(store: &dyn DocumentStore) -> Result<Vec<Document>, AppError> {
    store.find(Collection::Users, doc! {}).await
}

/// Whether the identity behind `email` holds the admin role. Unknown
/// identities are not admins.
pub async fn is_admin(store: &dyn DocumentStore, email: &str) -> Result<bool, AppError> {
    Ok(find_by_email(store, email)
        .await?
        .is_some_and(|user| user.is_admin()))
}

pub async fn status_of(store: &dyn DocumentStore, email: &str) -> Result<User, AppError> {
    find_by_email(store, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Registers an identity unless one already exists for the email.
/// Returns the new id, or `None` if the email was taken. The check and the
/// insert are one atomic store operation.
pub async fn sign_up(store: &dyn DocumentStore, request: SignUpRequest) -> Result<Option<Bson>, AppError> {
    let email = request.email.trim().to_string();
    if email.is_empty() {
        return Err(AppError::InvalidRequest("Email is required".to_string()));
    }

    let mut profile = request.profile;
    for field in SERVER_OWNED_FIELDS {
        profile.remove(field);
    }

    let mut document = to_document(&profile)?;
    document.insert("role", Role::User.as_str());
    document.insert("status", DEFAULT_STATUS);

    let inserted = store
        .insert_if_absent(Collection::Users, doc! { "email": &email }, document)
        .await?;

    match &inserted {
        Some(_) => log::info!("✅ User registered: {}", email),
        None => log::info!("ℹ️  User already exists: {}", email),
    }
    Ok(inserted)
}

pub async fn delete_user(store: &dyn DocumentStore, id: &str) -> Result<u64, AppError> {
    let object_id = parse_object_id(id)?;
    store
        .delete_one(Collection::Users, doc! { "_id": object_id })
        .await
}

pub async fn promote_to_admin(store: &dyn DocumentStore, id: &str) -> Result<UpdateOutcome, AppError> {
    let object_id = parse_object_id(id)?;
    store
        .update_one(
            Collection::Users,
            doc! { "_id": object_id },
            doc! { "role": Role::Admin.as_str() },
        )
        .await
}

pub async fn set_status(store: &dyn DocumentStore, id: &str, status: &str) -> Result<UpdateOutcome, AppError> {
    let object_id = parse_object_id(id)?;
    let status = status.trim();
    if status.is_empty() {
        return Err(AppError::InvalidRequest("Status is required".to_string()));
    }

    store
        .update_one(Collection::Users, doc! { "_id": object_id }, doc! { "status": status })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn sign_up_request(body: serde_json::Value) -> SignUpRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_ignores_client_role() {
        let store = MemoryStore::new();
        let inserted = sign_up(
            &store,
            sign_up_request(json!({ "email": "ana@carequest.dev", "name": "Ana", "role": "admin" })),
        )
        .await
        .unwrap();
        assert!(inserted.is_some());

        let user = find_by_email(&store, "ana@carequest.dev").await.unwrap().unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, "active");
        assert_eq!(user.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_repeated_sign_up_inserts_once() {
        let store = MemoryStore::new();
        let body = json!({ "email": "ana@carequest.dev" });

        assert!(sign_up(&store, sign_up_request(body.clone())).await.unwrap().is_some());
        assert!(sign_up(&store, sign_up_request(body)).await.unwrap().is_none());
        assert_eq!(list_users(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_promotion_makes_admin() {
        let store = MemoryStore::new();
        let id = sign_up(&store, sign_up_request(json!({ "email": "ana@carequest.dev" })))
            .await
            .unwrap()
            .unwrap();
        let hex = id.as_object_id().unwrap().to_hex();

        assert!(!is_admin(&store, "ana@carequest.dev").await.unwrap());
        let outcome = promote_to_admin(&store, &hex).await.unwrap();
        assert_eq!(outcome.modified_count, 1);
        assert!(is_admin(&store, "ana@carequest.dev").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_identity_is_not_admin_and_has_no_status() {
        let store = MemoryStore::new();
        assert!(!is_admin(&store, "ghost@carequest.dev").await.unwrap());
        assert!(matches!(
            status_of(&store, "ghost@carequest.dev").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            delete_user(&store, "not-an-id").await,
            Err(AppError::InvalidRequest(_))
        ));
    }
}

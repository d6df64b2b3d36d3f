use super::{Collection, DocumentStore, UpdateOutcome};
use crate::analytics::Pipeline;
use crate::utils::AppError;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Database, IndexModel};

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Timeouts
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));
        client_options.app_name = Some("carequest-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;
        log::info!("✅ MongoDB connected: {}", db_name);

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the access chain and sign-up rely on.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        // users(email) unique - identity key, backs insert-if-absent
        let users = self.collection(Collection::Users);
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                mongodb::options::IndexOptions::builder()
                    .unique(true)
                    .build(),
            )
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::warn!("   ⚠️  Could not create users(email) index: {}", e),
        }

        // bookings(email) - per-user booking lists
        let bookings = self.collection(Collection::Bookings);
        let booking_index = IndexModel::builder().keys(doc! { "email": 1 }).build();

        match bookings.create_index(booking_index).await {
            Ok(_) => log::info!("   ✅ Index created: bookings(email)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // bookings(bookId) - analytics grouping
        let book_id_index = IndexModel::builder().keys(doc! { "bookId": 1 }).build();

        match bookings.create_index(book_id_index).await {
            Ok(_) => log::info!("   ✅ Index created: bookings(bookId)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.as_str())
    }
}

#[async_trait]
impl DocumentStore for MongoDB {
    async fn find(&self, collection: Collection, filter: Document) -> Result<Vec<Document>, AppError> {
        let cursor = self.collection(collection).find(filter).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>, AppError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<Bson, AppError> {
        let result = self.collection(collection).insert_one(document).await?;
        Ok(result.inserted_id)
    }

    async fn insert_if_absent(
        &self,
        collection: Collection,
        key: Document,
        document: Document,
    ) -> Result<Option<Bson>, AppError> {
        let result = self
            .collection(collection)
            .update_one(key, doc! { "$setOnInsert": document })
            .upsert(true)
            .await?;
        Ok(result.upserted_id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": set })
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError> {
        let result = self
            .collection(collection)
            .update_many(filter, doc! { "$set": set })
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<u64, AppError> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, AppError> {
        Ok(self.collection(collection).estimated_document_count().await?)
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, AppError> {
        let cursor = self
            .collection(pipeline.source)
            .aggregate(pipeline.to_documents())
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

use super::{Collection, DocumentStore, UpdateOutcome};
use crate::analytics::{Accumulator, GroupKey, Pipeline, SortOrder, Stage};
use crate::utils::AppError;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process document store. Insertion order is the natural order, so
/// sorts are stable with respect to it.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: Document) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<Bson, AppError> {
        let id = ensure_id(&mut document);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn insert_if_absent(
        &self,
        collection: Collection,
        key: Document,
        document: Document,
    ) -> Result<Option<Bson>, AppError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|d| matches(d, &key)) {
            return Ok(None);
        }

        let mut inserted = key;
        for (field, value) in document {
            inserted.insert(field, value);
        }
        let id = ensure_id(&mut inserted);
        docs.push(inserted);
        Ok(Some(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError> {
        let mut collections = self.collections.write().await;
        let mut outcome = UpdateOutcome::default();
        if let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
        {
            outcome.matched_count = 1;
            if apply_set(doc, &set) {
                outcome.modified_count = 1;
            }
        }
        Ok(outcome)
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError> {
        let mut collections = self.collections.write().await;
        let mut outcome = UpdateOutcome::default();
        if let Some(docs) = collections.get_mut(&collection) {
            for doc in docs.iter_mut().filter(|d| matches(d, &filter)) {
                outcome.matched_count += 1;
                if apply_set(doc, &set) {
                    outcome.modified_count += 1;
                }
            }
        }
        Ok(outcome)
    }

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<u64, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, AppError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        let mut docs = collections.get(&pipeline.source).cloned().unwrap_or_default();
        for stage in &pipeline.stages {
            docs = run_stage(stage, docs, &collections);
        }
        Ok(docs)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

fn ensure_id(document: &mut Document) -> Bson {
    match document.get("_id") {
        Some(id) => id.clone(),
        None => {
            let id = Bson::ObjectId(ObjectId::new());
            document.insert("_id", id.clone());
            id
        }
    }
}

/// Applies `$set` semantics; returns whether anything changed.
fn apply_set(doc: &mut Document, set: &Document) -> bool {
    let mut changed = false;
    for (path, value) in set {
        if get_path(doc, path) != Some(value) {
            set_path(doc, path, value.clone());
            changed = true;
        }
    }
    changed
}

/// Equality match on every `(path, value)` of the filter. A null filter
/// value also matches a missing field.
fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(path, expected)| match get_path(doc, path) {
        Some(actual) => actual == expected,
        None => *expected == Bson::Null,
    })
}

fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

fn value_at(doc: &Document, path: &str) -> Bson {
    get_path(doc, path).cloned().unwrap_or(Bson::Null)
}

/// Running `$sum`: stays integral until a double is added.
#[derive(Debug, Clone, Copy)]
enum Total {
    Int(i64),
    Float(f64),
}

impl Total {
    fn add(self, value: Option<&Bson>) -> Self {
        match (self, value) {
            (Total::Int(t), Some(Bson::Int32(n))) => Total::Int(t + i64::from(*n)),
            (Total::Int(t), Some(Bson::Int64(n))) => Total::Int(t + n),
            (Total::Int(t), Some(Bson::Double(n))) => Total::Float(t as f64 + n),
            (Total::Float(t), Some(Bson::Int32(n))) => Total::Float(t + f64::from(*n)),
            (Total::Float(t), Some(Bson::Int64(n))) => Total::Float(t + *n as f64),
            (Total::Float(t), Some(Bson::Double(n))) => Total::Float(t + n),
            (total, _) => total,
        }
    }

    fn into_bson(self) -> Bson {
        match self {
            Total::Int(n) => Bson::Int64(n),
            Total::Float(n) => Bson::Double(n),
        }
    }
}

fn run_stage(
    stage: &Stage,
    docs: Vec<Document>,
    collections: &HashMap<Collection, Vec<Document>>,
) -> Vec<Document> {
    match stage {
        Stage::Group { key, accumulators } => group(docs, key, accumulators),
        Stage::ToObjectId { field } => docs
            .into_iter()
            .map(|mut doc| {
                let converted = match get_path(&doc, field) {
                    Some(Bson::ObjectId(id)) => Bson::ObjectId(*id),
                    Some(Bson::String(hex)) => ObjectId::parse_str(hex)
                        .map(Bson::ObjectId)
                        .unwrap_or(Bson::Null),
                    _ => Bson::Null,
                };
                set_path(&mut doc, field, converted);
                doc
            })
            .collect(),
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => {
            let foreign = collections.get(from).map(Vec::as_slice).unwrap_or(&[]);
            docs.into_iter()
                .map(|mut doc| {
                    let local = value_at(&doc, local_field);
                    let joined: Vec<Bson> = foreign
                        .iter()
                        .filter(|f| value_at(f, foreign_field) == local)
                        .cloned()
                        .map(Bson::Document)
                        .collect();
                    set_path(&mut doc, as_field, Bson::Array(joined));
                    doc
                })
                .collect()
        }
        Stage::Unwind { path } => docs
            .into_iter()
            .flat_map(|doc| match get_path(&doc, path) {
                Some(Bson::Array(items)) => items
                    .clone()
                    .into_iter()
                    .map(|item| {
                        let mut out = doc.clone();
                        set_path(&mut out, path, item);
                        out
                    })
                    .collect::<Vec<_>>(),
                Some(Bson::Null) | None => Vec::new(),
                Some(_) => vec![doc.clone()],
            })
            .collect(),
        Stage::Project { fields } => docs
            .into_iter()
            .map(|doc| {
                let mut out = Document::new();
                for (name, path) in fields {
                    if let Some(value) = get_path(&doc, path) {
                        out.insert(name.clone(), value.clone());
                    }
                }
                out
            })
            .collect(),
        Stage::Sort { field, order } => {
            let mut docs = docs;
            docs.sort_by(|a, b| {
                let ord = compare(get_path(a, field), get_path(b, field));
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
            docs
        }
        Stage::Limit(n) => {
            let mut docs = docs;
            docs.truncate(usize::try_from(*n).unwrap_or(0));
            docs
        }
    }
}

fn group(docs: Vec<Document>, key: &GroupKey, accumulators: &[(String, Accumulator)]) -> Vec<Document> {
    // Bson has no Hash impl; groups are few, so a linear scan keeps first-seen order.
    let mut groups: Vec<(Bson, Vec<Total>)> = Vec::new();

    for doc in &docs {
        let group_key = match key {
            GroupKey::All => Bson::Null,
            GroupKey::Field(path) => value_at(doc, path),
            GroupKey::Fields(fields) => {
                let mut compound = Document::new();
                for (name, path) in fields {
                    compound.insert(name.clone(), value_at(doc, path));
                }
                Bson::Document(compound)
            }
        };

        let index = match groups.iter().position(|(k, _)| *k == group_key) {
            Some(index) => index,
            None => {
                groups.push((group_key, vec![Total::Int(0); accumulators.len()]));
                groups.len() - 1
            }
        };

        let totals = &mut groups[index].1;
        for (total, (_, acc)) in totals.iter_mut().zip(accumulators) {
            *total = match acc {
                Accumulator::Count => total.add(Some(&Bson::Int64(1))),
                Accumulator::Sum(path) => total.add(get_path(doc, path)),
                Accumulator::SumWhere { value, when, equals } => {
                    if value_at(doc, when) == *equals {
                        total.add(get_path(doc, value))
                    } else {
                        *total
                    }
                }
            };
        }
    }

    groups
        .into_iter()
        .map(|(group_key, totals)| {
            let mut out = Document::new();
            out.insert("_id", group_key);
            for ((name, _), total) in accumulators.iter().zip(totals) {
                out.insert(name.clone(), total.into_bson());
            }
            out
        })
        .collect()
}

fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    fn number(value: &Bson) -> Option<f64> {
        match value {
            Bson::Int32(n) => Some(f64::from(*n)),
            Bson::Int64(n) => Some(*n as f64),
            Bson::Double(n) => Some(*n),
            _ => None,
        }
    }

    match (a, b) {
        (None | Some(Bson::Null), None | Some(Bson::Null)) => Ordering::Equal,
        (None | Some(Bson::Null), _) => Ordering::Less,
        (_, None | Some(Bson::Null)) => Ordering::Greater,
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (number(x), number(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_id_and_find_matches_fields() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Users, doc! { "email": "a@carequest.dev", "role": "user" })
            .await
            .unwrap();
        store
            .insert_one(Collection::Users, doc! { "email": "b@carequest.dev", "role": "admin" })
            .await
            .unwrap();

        let found = store
            .find_one(Collection::Users, doc! { "_id": id.clone() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("email").unwrap(), "a@carequest.dev");

        let admins = store.find(Collection::Users, doc! { "role": "admin" }).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(store.estimated_count(Collection::Users).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_if_absent_inserts_once() {
        let store = MemoryStore::new();
        let first = store
            .insert_if_absent(
                Collection::Users,
                doc! { "email": "a@carequest.dev" },
                doc! { "name": "A", "role": "user" },
            )
            .await
            .unwrap();
        let second = store
            .insert_if_absent(
                Collection::Users,
                doc! { "email": "a@carequest.dev" },
                doc! { "name": "Other" },
            )
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let users = store.find(Collection::Users, doc! {}).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].get_str("name").unwrap(), "A");
    }

    #[tokio::test]
    async fn test_update_reports_matched_and_modified() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Bookings, doc! { "email": "a@carequest.dev", "status": "Pending" })
            .await
            .unwrap();

        let changed = store
            .update_one(
                Collection::Bookings,
                doc! { "email": "a@carequest.dev" },
                doc! { "status": "Delivered", "report.url": "https://files/r1.pdf" },
            )
            .await
            .unwrap();
        let unchanged = store
            .update_one(
                Collection::Bookings,
                doc! { "email": "a@carequest.dev" },
                doc! { "status": "Delivered" },
            )
            .await
            .unwrap();

        assert_eq!(changed, UpdateOutcome { matched_count: 1, modified_count: 1 });
        assert_eq!(unchanged, UpdateOutcome { matched_count: 1, modified_count: 0 });

        let booking = store
            .find_one(Collection::Bookings, doc! {})
            .await
            .unwrap()
            .unwrap();
        assert_eq!(booking.get_document("report").unwrap().get_str("url").unwrap(), "https://files/r1.pdf");
    }

    #[tokio::test]
    async fn test_delete_one_removes_single_match() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            store
                .insert_one(Collection::Reviews, doc! { "rating": 5 })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_one(Collection::Reviews, doc! { "rating": 5 }).await.unwrap(), 1);
        assert_eq!(store.delete_one(Collection::Doctors, doc! {}).await.unwrap(), 0);
        assert_eq!(store.estimated_count(Collection::Reviews).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_then_unwind_is_inner_join() {
        let store = MemoryStore::new();
        let test_id = ObjectId::new();
        store
            .insert_one(Collection::Tests, doc! { "_id": test_id, "name": "CBC" })
            .await
            .unwrap();
        store
            .insert_one(Collection::Bookings, doc! { "bookId": test_id.to_hex() })
            .await
            .unwrap();
        store
            .insert_one(Collection::Bookings, doc! { "bookId": ObjectId::new().to_hex() })
            .await
            .unwrap();
        store
            .insert_one(Collection::Bookings, doc! { "bookId": "not-an-object-id" })
            .await
            .unwrap();

        let pipeline = Pipeline::over(Collection::Bookings)
            .stage(Stage::ToObjectId { field: "bookId".to_string() })
            .stage(Stage::Lookup {
                from: Collection::Tests,
                local_field: "bookId".to_string(),
                foreign_field: "_id".to_string(),
                as_field: "test".to_string(),
            })
            .stage(Stage::Unwind { path: "test".to_string() });

        let joined = store.aggregate(&pipeline).await.unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].get_document("test").unwrap().get_str("name").unwrap(), "CBC");
    }

    #[tokio::test]
    async fn test_sort_descending_is_stable_for_ties() {
        let store = MemoryStore::new();
        for (name, count) in [("a", 1), ("b", 3), ("c", 1), ("d", 3)] {
            store
                .insert_one(Collection::Tests, doc! { "name": name, "count": count })
                .await
                .unwrap();
        }

        let pipeline = Pipeline::over(Collection::Tests)
            .stage(Stage::Sort {
                field: "count".to_string(),
                order: SortOrder::Descending,
            })
            .stage(Stage::Limit(3));

        let names: Vec<String> = store
            .aggregate(&pipeline)
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b", "d", "a"]);
    }

    #[tokio::test]
    async fn test_sort_ascending_puts_missing_values_first() {
        let store = MemoryStore::new();
        store.insert_one(Collection::Tests, doc! { "name": "Lipid", "price": 30.0 }).await.unwrap();
        store.insert_one(Collection::Tests, doc! { "name": "Free" }).await.unwrap();
        store.insert_one(Collection::Tests, doc! { "name": "CBC", "price": 12 }).await.unwrap();

        let pipeline = Pipeline::over(Collection::Tests).stage(Stage::Sort {
            field: "price".to_string(),
            order: SortOrder::Ascending,
        });

        let names: Vec<String> = store
            .aggregate(&pipeline)
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Free", "CBC", "Lipid"]);
        assert_eq!(
            pipeline.to_documents(),
            vec![doc! { "$sort": { "price": 1 } }]
        );
    }

    #[tokio::test]
    async fn test_group_all_sums_mixed_numbers() {
        let store = MemoryStore::new();
        store.insert_one(Collection::Payments, doc! { "price": 10 }).await.unwrap();
        store.insert_one(Collection::Payments, doc! { "price": 2.5 }).await.unwrap();
        store.insert_one(Collection::Payments, doc! { "note": "no price" }).await.unwrap();

        let pipeline = Pipeline::over(Collection::Payments).stage(Stage::Group {
            key: GroupKey::All,
            accumulators: vec![("totalRevenue".to_string(), Accumulator::Sum("price".to_string()))],
        });

        let rows = store.aggregate(&pipeline).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_f64("totalRevenue").unwrap(), 12.5);
    }
}

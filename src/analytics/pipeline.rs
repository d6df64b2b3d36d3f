//! Typed aggregation pipelines.
//!
//! A [`Pipeline`] is an ordered list of [`Stage`] descriptors over a source
//! collection. It renders to MongoDB aggregation syntax with
//! [`Pipeline::to_documents`] and is evaluated directly by the in-memory
//! store, so the same description drives both backends.

use crate::database::Collection;
use mongodb::bson::{doc, Bson, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Grouping key of a `Group` stage; becomes the `_id` of each output row.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// Single group over every input document (`_id: null`).
    All,
    /// Group by the value at a field path.
    Field(String),
    /// Compound key: `(output name, field path)` pairs.
    Fields(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Number of documents in the group.
    Count,
    /// Sum of the numeric values at a field path. Missing or non-numeric
    /// values contribute nothing.
    Sum(String),
    /// Sum of `value` over the documents whose `when` path equals `equals`.
    SumWhere {
        value: String,
        when: String,
        equals: Bson,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Group {
        key: GroupKey,
        accumulators: Vec<(String, Accumulator)>,
    },
    /// Rewrites a hex-string field as an object id. Values that do not parse
    /// become null, which never joins.
    ToObjectId { field: String },
    /// Left-outer join storing matches as an array under `as_field`.
    Lookup {
        from: Collection,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// One output per array element; documents with an empty or missing
    /// array are dropped. Lookup followed by unwind is an inner join.
    Unwind { path: String },
    /// Reshapes each document to exactly `(output name, field path)` pairs.
    Project { fields: Vec<(String, String)> },
    Sort { field: String, order: SortOrder },
    Limit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub source: Collection,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn over(source: Collection) -> Self {
        Self {
            source,
            stages: Vec::new(),
        }
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Renders the stages as a MongoDB aggregation pipeline.
    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

fn field_ref(path: &str) -> String {
    format!("${}", path)
}

impl GroupKey {
    fn to_bson(&self) -> Bson {
        match self {
            GroupKey::All => Bson::Null,
            GroupKey::Field(path) => Bson::String(field_ref(path)),
            GroupKey::Fields(fields) => {
                let mut key = Document::new();
                for (name, path) in fields {
                    key.insert(name.clone(), field_ref(path));
                }
                Bson::Document(key)
            }
        }
    }
}

impl Accumulator {
    fn to_document(&self) -> Document {
        match self {
            Accumulator::Count => doc! { "$sum": 1 },
            Accumulator::Sum(path) => doc! { "$sum": field_ref(path) },
            Accumulator::SumWhere { value, when, equals } => doc! {
                "$sum": {
                    "$cond": [
                        { "$eq": [field_ref(when), equals.clone()] },
                        field_ref(value),
                        0
                    ]
                }
            },
        }
    }
}

impl Stage {
    pub fn to_document(&self) -> Document {
        match self {
            Stage::Group { key, accumulators } => {
                let mut group = doc! { "_id": key.to_bson() };
                for (name, acc) in accumulators {
                    group.insert(name.clone(), acc.to_document());
                }
                doc! { "$group": group }
            }
            Stage::ToObjectId { field } => {
                let mut fields = Document::new();
                fields.insert(
                    field.clone(),
                    doc! {
                        "$convert": {
                            "input": field_ref(field),
                            "to": "objectId",
                            "onError": Bson::Null,
                            "onNull": Bson::Null,
                        }
                    },
                );
                doc! { "$addFields": fields }
            }
            Stage::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
            } => doc! {
                "$lookup": {
                    "from": from.as_str(),
                    "localField": local_field.as_str(),
                    "foreignField": foreign_field.as_str(),
                    "as": as_field.as_str(),
                }
            },
            Stage::Unwind { path } => doc! { "$unwind": field_ref(path) },
            Stage::Project { fields } => {
                let mut projection = Document::new();
                if !fields.iter().any(|(name, _)| name == "_id") {
                    projection.insert("_id", 0);
                }
                for (name, path) in fields {
                    projection.insert(name.clone(), field_ref(path));
                }
                doc! { "$project": projection }
            }
            Stage::Sort { field, order } => {
                let mut sort = Document::new();
                sort.insert(field.clone(), order.as_i32());
                doc! { "$sort": sort }
            }
            Stage::Limit(n) => doc! { "$limit": *n },
        }
    }
}

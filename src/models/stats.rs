use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dashboard summary: collection sizes and total revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AdminStats {
    pub users: u64,
    pub tests: u64,
    pub bookings: u64,
    pub payments: u64,
    pub revenue: f64,
}

/// Per-category booking totals. `category` is whatever the test documents
/// store, null when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub category: Value,
    pub total_count: i64,
    pub total_revenue: f64,
    pub pending_count: i64,
    pub delivered_count: i64,
}

/// A test with its booking count. Catalog fields are passed through as
/// stored, so a loosely typed catalog entry still shows up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PopularTest {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub image: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub category: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub price: Value,
    pub count: i64,
}

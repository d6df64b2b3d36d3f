use crate::database::UpdateOutcome;
use crate::utils::bson_to_json;
use mongodb::bson::Bson;
use serde::Serialize;

/// Write acknowledgements, shaped like the driver results clients already
/// consume.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResponse {
    pub acknowledged: bool,
    pub inserted_id: serde_json::Value,
}

impl InsertResponse {
    pub fn new(id: Bson) -> Self {
        Self {
            acknowledged: true,
            inserted_id: bson_to_json(id),
        }
    }
}

/// Answer to a sign-up for an email that is already registered.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingUserResponse {
    pub message: String,
    pub inserted_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateOutcome> for UpdateResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            acknowledged: true,
            matched_count: outcome.matched_count,
            modified_count: outcome.modified_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResponse {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

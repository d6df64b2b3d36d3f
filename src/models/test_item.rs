use serde::{Deserialize, Serialize};

/// Catalog entry of the `tests` collection (a diagnostic test).
///
/// Used for create and full-update bodies; reads return the stored
/// document as is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPayload {
    pub name: String,
    pub image: String,
    pub description: String,
    pub price: f64,
    /// Date the test is offered on, as sent by the client.
    pub date: String,
    pub category: String,
    pub capacity: u32,
    pub slots: u32,
}

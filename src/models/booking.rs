use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Delivered,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Delivered => "Delivered",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

/// Body of `POST /bookings`. The owner email and the initial status are
/// set by the server; everything else in `details` is kept for display.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub book_id: String,
    pub final_price: f64,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
    #[serde(default)]
    pub report: Option<String>,
}

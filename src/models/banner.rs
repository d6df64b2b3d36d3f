use serde::{Deserialize, Serialize};

/// Promotional banner shown on the home page. New banners start inactive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerRequest {
    pub name: String,
    pub image: String,
    pub title: String,
    pub description: String,
    pub coupon_code: String,
    pub coupon_rate: f64,
}

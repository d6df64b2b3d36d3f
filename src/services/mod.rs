pub mod analytics_service;
pub mod auth_service;
pub mod banner_service;
pub mod booking_service;
pub mod catalog_service;
pub mod payment_service;
pub mod user_service;

pub use auth_service::{Claims, TokenService};
pub use payment_service::PaymentProvider;
